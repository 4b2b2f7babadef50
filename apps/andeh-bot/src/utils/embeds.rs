use serenity::all::{CreateEmbed, CreateEmbedFooter};

/// Embed colors used across the bot.
pub struct Colors;

impl Colors {
    pub const ARSENAL: u32 = 0xE67E22;
    pub const SUCCESS: u32 = 0x2ECC71;
    pub const WARNING: u32 = 0xF1C40F;
    pub const ERROR: u32 = 0xE74C3C;
    pub const DEBUG: u32 = 0x5865F2;
}

/// Create a standard embed with default color, footer, and timestamp.
pub fn arsenal_embed() -> CreateEmbed {
    base_embed(Colors::ARSENAL)
}

/// Embed for a completed action.
pub fn success_embed() -> CreateEmbed {
    base_embed(Colors::SUCCESS)
}

/// Embed for rejected input or a degraded result.
pub fn warning_embed() -> CreateEmbed {
    base_embed(Colors::WARNING)
}

/// Embed for a failed command.
pub fn error_embed() -> CreateEmbed {
    base_embed(Colors::ERROR)
}

/// Embed for owner-only debugging output.
pub fn debug_embed() -> CreateEmbed {
    base_embed(Colors::DEBUG)
}

fn base_embed(color: u32) -> CreateEmbed {
    CreateEmbed::default()
        .color(color)
        .footer(CreateEmbedFooter::new("Andeh's Arsenal"))
        .timestamp(serenity::model::Timestamp::now())
}
