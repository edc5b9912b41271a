//! Alert components for notices and form validation messages.

use maud::{html, Markup, Render};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertVariant {
    Success,
    Error,
    Info,
}

impl AlertVariant {
    #[must_use]
    pub const fn class(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
        }
    }
}

/// A styled notice box.
///
/// # Example
///
/// ```ignore
/// use crate::components::alert::Alert;
///
/// let alert = Alert::success("Your password was changed.").with_title("Done");
/// ```
#[derive(Debug, Clone)]
pub struct Alert<'a> {
    pub variant: AlertVariant,
    pub title: Option<&'a str>,
    pub message: &'a str,
}

impl<'a> Alert<'a> {
    #[must_use]
    pub const fn new(variant: AlertVariant, message: &'a str) -> Self {
        Self {
            variant,
            title: None,
            message,
        }
    }

    #[must_use]
    pub const fn success(message: &'a str) -> Self {
        Self::new(AlertVariant::Success, message)
    }

    #[must_use]
    pub const fn error(message: &'a str) -> Self {
        Self::new(AlertVariant::Error, message)
    }

    #[must_use]
    pub const fn info(message: &'a str) -> Self {
        Self::new(AlertVariant::Info, message)
    }

    #[must_use]
    pub const fn with_title(mut self, title: &'a str) -> Self {
        self.title = Some(title);
        self
    }
}

impl Render for Alert<'_> {
    fn render(&self) -> Markup {
        html! {
            article class=(self.variant.class()) role="alert" {
                @if let Some(title) = self.title {
                    strong { (title) }
                    " "
                }
                (self.message)
            }
        }
    }
}

/// Validation messages attached to one field (or to the whole form).
/// Renders nothing when there are no messages.
#[derive(Debug, Clone, Copy)]
pub struct ErrorList<'a> {
    pub messages: &'a [String],
}

impl<'a> ErrorList<'a> {
    #[must_use]
    pub const fn new(messages: &'a [String]) -> Self {
        Self { messages }
    }
}

impl Render for ErrorList<'_> {
    fn render(&self) -> Markup {
        html! {
            @if !self.messages.is_empty() {
                ul class="errorlist" {
                    @for message in self.messages {
                        li { (message) }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_success() {
        let html = Alert::success("Operation completed!").render().into_string();
        assert!(html.contains("class=\"success\""));
        assert!(html.contains("Operation completed!"));
    }

    #[test]
    fn test_alert_error_with_title() {
        let html = Alert::error("Something went wrong")
            .with_title("Error")
            .render()
            .into_string();
        assert!(html.contains("class=\"error\""));
        assert!(html.contains("<strong>Error</strong>"));
    }

    #[test]
    fn test_error_list() {
        let messages = vec!["This field is required.".to_string()];
        let html = ErrorList::new(&messages).render().into_string();
        assert_eq!(
            html,
            r#"<ul class="errorlist"><li>This field is required.</li></ul>"#
        );
    }

    #[test]
    fn test_empty_error_list_renders_nothing() {
        assert!(ErrorList::new(&[]).render().into_string().is_empty());
    }
}
