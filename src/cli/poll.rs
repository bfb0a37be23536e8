//! One poll of the storage array: authenticate, fetch, map

use std::path::Path;

use crate::cache::SessionClient;
use crate::cli::{CommandContext, Poll};
use crate::client::{MsaApi, MsaClient, StorageHost};
use crate::components::{map_detail, map_discovery, map_health};
use crate::error::Result;
use crate::output::format_json;
use crate::xml::Document;

/// Run `poll` against the array named in `ctx` and return the output line.
pub async fn run(ctx: &CommandContext, poll: &Poll) -> Result<String> {
    let host = StorageHost::resolve(&ctx.address).await?;
    let client = SessionClient::open(MsaClient::new(host, &ctx.client)?, &ctx.client)?;
    execute(&client, ctx, poll).await
}

/// Poll through an already built client.
pub async fn execute<C: MsaApi>(
    client: &SessionClient<C>,
    ctx: &CommandContext,
    poll: &Poll,
) -> Result<String> {
    let kind = ctx.kind;
    match poll {
        Poll::Discovery => {
            let document = fetch(client, ctx, &kind.show_path()).await?;
            Ok(format_json(&map_discovery(&document, kind)?)?)
        }
        Poll::Detail => {
            let document = fetch(client, ctx, &kind.show_path()).await?;
            Ok(format_json(&map_detail(&document, kind)?)?)
        }
        Poll::Health(item) => {
            let document = fetch(client, ctx, &kind.health_path(item)).await?;
            Ok(map_health(&document, kind, item)?)
        }
    }
}

/// Authenticate, GET `path` and unwrap the payload of a successful answer.
async fn fetch<C: MsaApi>(
    client: &SessionClient<C>,
    ctx: &CommandContext,
    path: &[&str],
) -> Result<Document> {
    log::debug!("Polling {} for {}", client.host().dns_name(), path.join("/"));
    let session_key = client.session(&ctx.credential_hash).await?;
    let response = client.request(path, &session_key).await?;

    if let Some(target) = &ctx.save_xml {
        save_xml(target, &response.body)?;
    }

    Ok(response.envelope.into_payload()?)
}

fn save_xml(target: &Path, body: &[u8]) -> Result<()> {
    std::fs::write(target, body)?;
    log::debug!("Saved raw response to {}", target.display());
    Ok(())
}
