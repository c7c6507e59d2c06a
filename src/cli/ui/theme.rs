use colored::{Color, Colorize};
use inquire::ui::{Color as PromptColor, RenderConfig, StyleSheet, Styled};

use crate::provider::ProviderId;

/// 输出语气
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Done,
    Note,
    Caution,
    Failure,
}

impl Tone {
    fn color(self) -> Color {
        match self {
            Tone::Done => Color::Green,
            Tone::Note => Color::Cyan,
            Tone::Caution => Color::Yellow,
            Tone::Failure => Color::Red,
        }
    }

    pub fn paint(self, text: &str) -> String {
        text.color(self.color()).to_string()
    }
}

fn accent_color(provider: ProviderId) -> Color {
    match provider {
        ProviderId::OpenRouter => Color::BrightBlue,
        ProviderId::Anthropic => Color::BrightCyan,
        ProviderId::OpenAi => Color::BrightGreen,
        ProviderId::Gemini => Color::BrightMagenta,
        ProviderId::DeepSeek => Color::BrightYellow,
        ProviderId::Xai => Color::BrightWhite,
    }
}

/// 供应商名称、当前密钥等重点内容
pub fn accent(provider: ProviderId, text: &str) -> String {
    text.color(accent_color(provider)).bold().to_string()
}

/// 删除确认等提示框使用供应商强调色
pub fn prompt_config(provider: ProviderId) -> RenderConfig<'static> {
    if !colored::control::SHOULD_COLORIZE.should_colorize() {
        return RenderConfig::empty();
    }

    let color = match accent_color(provider) {
        Color::BrightBlue => PromptColor::LightBlue,
        Color::BrightCyan => PromptColor::LightCyan,
        Color::BrightGreen => PromptColor::LightGreen,
        Color::BrightMagenta => PromptColor::LightMagenta,
        Color::BrightYellow => PromptColor::LightYellow,
        _ => PromptColor::White,
    };
    RenderConfig::default_colored()
        .with_prompt_prefix(Styled::new("?").with_fg(color))
        .with_answer(StyleSheet::new().with_fg(color))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    struct ForceColor;

    impl ForceColor {
        fn on() -> Self {
            colored::control::set_override(true);
            Self
        }
    }

    impl Drop for ForceColor {
        fn drop(&mut self) {
            colored::control::unset_override();
        }
    }

    #[test]
    #[serial]
    fn accent_follows_the_provider() {
        let _color = ForceColor::on();
        assert_eq!(
            accent(ProviderId::OpenAi, "x"),
            "x".bright_green().bold().to_string()
        );
        assert_eq!(
            accent(ProviderId::Anthropic, "x"),
            "x".bright_cyan().bold().to_string()
        );
        assert_ne!(accent(ProviderId::Gemini, "x"), accent(ProviderId::Xai, "x"));
    }

    #[test]
    #[serial]
    fn tones_paint_without_provider_state() {
        let _color = ForceColor::on();
        assert_eq!(Tone::Done.paint("ok"), "ok".green().to_string());
        assert_eq!(Tone::Failure.paint("no"), "no".red().to_string());
    }

    #[test]
    #[serial]
    fn disabled_color_strips_styling() {
        colored::control::set_override(false);
        assert_eq!(accent(ProviderId::DeepSeek, "plain"), "plain");
        assert_eq!(Tone::Caution.paint("plain"), "plain");
        colored::control::unset_override();
    }
}
