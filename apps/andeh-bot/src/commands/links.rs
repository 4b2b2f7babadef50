use crate::extensions::{Extension, ExtensionHost};
use crate::patterns::PatternRegistry;
use crate::utils::embeds;
use crate::Context;
use async_trait::async_trait;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

type Error = crate::error::Error;

/// Link and mention helpers built on the shared pattern registry.
pub struct Links;

#[async_trait]
impl Extension for Links {
    fn name(&self) -> &'static str {
        "links"
    }

    async fn load(&self, host: &mut ExtensionHost) -> Result<(), Error> {
        host.add_command(self.name(), inspect())?;
        host.add_command(self.name(), checkurl())?;
        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum TextKind {
    Invite(String),
    Mention(u64),
    Url,
    Plain,
}

/// Classify a piece of text. Invites are checked before generic URLs since
/// every invite link is also a URL.
pub fn classify(patterns: &PatternRegistry, text: &str) -> Result<TextKind, Error> {
    let text = text.trim();

    if let Some(caps) = patterns.get("invite")?.captures(text) {
        return Ok(TextKind::Invite(caps[1].to_string()));
    }
    if let Some(caps) = patterns.get("user_mention")?.captures(text) {
        if let Ok(id) = caps[1].parse() {
            return Ok(TextKind::Mention(id));
        }
    }
    if patterns.url()?.is_match(text) {
        return Ok(TextKind::Url);
    }
    Ok(TextKind::Plain)
}

/// Whether the bot may send a request to `url` on a member's behalf.
///
/// Loopback, private, link-local and other non-public IP literals are refused,
/// as are `localhost` and internal-only domain suffixes. Hostnames are not
/// resolved here.
pub fn is_public_target(url: &str) -> bool {
    let Ok(parsed) = reqwest::Url::parse(url) else {
        return false;
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };

    let host = host.trim_start_matches('[').trim_end_matches(']');
    if let Ok(ip) = host.parse::<IpAddr>() {
        return match ip {
            IpAddr::V4(v4) => is_public_v4(v4),
            IpAddr::V6(v6) => is_public_v6(v6),
        };
    }

    let host = host.trim_end_matches('.').to_ascii_lowercase();
    !(host == "localhost"
        || [".localhost", ".local", ".internal", ".lan", ".home.arpa"]
            .iter()
            .any(|suffix| host.ends_with(suffix)))
}

fn is_public_v4(ip: Ipv4Addr) -> bool {
    let [a, b, ..] = ip.octets();
    !(ip.is_loopback()
        || ip.is_private()
        || ip.is_link_local()
        || ip.is_unspecified()
        || ip.is_broadcast()
        || ip.is_documentation()
        || ip.is_multicast()
        // 100.64.0.0/10 carrier-grade NAT
        || (a == 100 && (64..128).contains(&b))
        // 0.0.0.0/8
        || a == 0)
}

fn is_public_v6(ip: Ipv6Addr) -> bool {
    if let Some(v4) = ip.to_ipv4_mapped() {
        return is_public_v4(v4);
    }
    let first = ip.segments()[0];
    !(ip.is_loopback()
        || ip.is_unspecified()
        || ip.is_multicast()
        // fc00::/7 unique local
        || (first & 0xfe00) == 0xfc00
        // fe80::/10 link-local
        || (first & 0xffc0) == 0xfe80)
}

/// Tell whether some text is a link, an invite or a mention.
#[poise::command(slash_command, prefix_command)]
pub async fn inspect(
    ctx: Context<'_>,
    #[description = "Text to inspect"]
    #[rest]
    text: String,
) -> Result<(), Error> {
    let verdict = match classify(&ctx.data().patterns, &text)? {
        TextKind::Invite(code) => format!("Discord invite with code `{code}`"),
        TextKind::Mention(id) => format!("Mention of <@{id}>"),
        TextKind::Url => "A web link".to_string(),
        TextKind::Plain => "Plain text".to_string(),
    };

    let embed = embeds::arsenal_embed().title("Inspect").description(verdict);
    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}

/// Check that a link is well formed and reachable.
#[poise::command(slash_command, prefix_command, guild_only)]
pub async fn checkurl(
    ctx: Context<'_>,
    #[description = "Link to check"] url: String,
) -> Result<(), Error> {
    let url = url.trim();
    if !ctx.data().patterns.url()?.is_match(url) {
        let embed = embeds::warning_embed()
            .title("Not a link")
            .description(format!("`{url}` does not look like an http(s) URL."));
        ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
            .await?;
        return Ok(());
    }

    if !is_public_target(url) {
        let embed = embeds::warning_embed()
            .title("Not allowed")
            .description("Only public internet addresses can be checked.");
        ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
            .await?;
        return Ok(());
    }

    ctx.defer_ephemeral().await?;

    let embed = match ctx.data().http.head(url).send().await {
        Ok(resp) if resp.status().is_success() || resp.status().is_redirection() => {
            embeds::success_embed()
                .title("Reachable")
                .description(format!("`{url}` answered with {}", resp.status()))
        }
        Ok(resp) => embeds::warning_embed()
            .title("Unhealthy")
            .description(format!("`{url}` answered with {}", resp.status())),
        Err(e) => {
            tracing::debug!(url, error = %e, "Link check failed");
            embeds::error_embed()
                .title("Unreachable")
                .description(format!("Could not reach `{url}`."))
        }
    };

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}
