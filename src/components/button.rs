//! Button components for the web UI.
//!
//! [`Button`] renders as either a `<button>` or an `<a>` depending on whether
//! an href is set. [`ActionButton`] wraps a single button in its own POST form
//! carrying the viewer's CSRF token, for one-click state changes such as
//! following an author or deleting a post.

use maud::{html, Markup, Render};

use crate::auth::csrf::CSRF_FIELD;

/// Button style variants matching CSS classes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ButtonVariant {
    #[default]
    Primary,
    Outline,
    Danger,
}

impl ButtonVariant {
    #[must_use]
    pub fn class(&self) -> &'static str {
        match self {
            Self::Primary => "btn btn-primary",
            Self::Outline => "btn outline",
            Self::Danger => "btn btn-danger",
        }
    }
}

/// A configurable button component.
///
/// # Example
///
/// ```ignore
/// use crate::components::button::Button;
///
/// let save = Button::primary("Save").r#type("submit");
/// let edit = Button::outline("Edit").href("/posts/1/edit/");
/// ```
#[derive(Debug, Clone)]
pub struct Button<'a> {
    pub label: &'a str,
    pub variant: ButtonVariant,
    /// Renders as `<a>` when set.
    pub href: Option<&'a str>,
    pub r#type: Option<&'a str>,
    pub class: Option<&'a str>,
}

impl<'a> Button<'a> {
    #[must_use]
    pub fn new(label: &'a str, variant: ButtonVariant) -> Self {
        Self {
            label,
            variant,
            href: None,
            r#type: None,
            class: None,
        }
    }

    #[must_use]
    pub fn primary(label: &'a str) -> Self {
        Self::new(label, ButtonVariant::Primary)
    }

    #[must_use]
    pub fn outline(label: &'a str) -> Self {
        Self::new(label, ButtonVariant::Outline)
    }

    #[must_use]
    pub fn danger(label: &'a str) -> Self {
        Self::new(label, ButtonVariant::Danger)
    }

    #[must_use]
    pub fn href(mut self, href: &'a str) -> Self {
        self.href = Some(href);
        self
    }

    #[must_use]
    pub fn r#type(mut self, r#type: &'a str) -> Self {
        self.r#type = Some(r#type);
        self
    }

    #[must_use]
    pub fn class(mut self, class: &'a str) -> Self {
        self.class = Some(class);
        self
    }

    fn build_class(&self) -> String {
        let mut classes = self.variant.class().to_string();
        if let Some(extra) = self.class {
            classes.push(' ');
            classes.push_str(extra);
        }
        classes
    }
}

impl Render for Button<'_> {
    fn render(&self) -> Markup {
        let classes = self.build_class();

        if let Some(href) = self.href {
            html! {
                a class=(classes) href=(href) { (self.label) }
            }
        } else {
            html! {
                button class=(classes) type=(self.r#type.unwrap_or("button")) {
                    (self.label)
                }
            }
        }
    }
}

/// A one-button POST form with a CSRF field.
#[derive(Debug, Clone)]
pub struct ActionButton<'a> {
    pub action: &'a str,
    pub csrf_token: &'a str,
    pub button: Button<'a>,
    pub confirm: Option<&'a str>,
}

impl<'a> ActionButton<'a> {
    #[must_use]
    pub fn new(action: &'a str, csrf_token: &'a str, button: Button<'a>) -> Self {
        Self {
            action,
            csrf_token,
            button: button.r#type("submit"),
            confirm: None,
        }
    }

    /// Ask the browser to confirm before submitting.
    #[must_use]
    pub fn confirm(mut self, message: &'a str) -> Self {
        self.confirm = Some(message);
        self
    }
}

impl Render for ActionButton<'_> {
    fn render(&self) -> Markup {
        let onsubmit = self.confirm.map(|msg| {
            format!("return confirm('{}');", msg.replace('\\', "\\\\").replace('\'', "\\'"))
        });

        html! {
            form class="inline-form" action=(self.action) method="post" onsubmit=[onsubmit] {
                input type="hidden" name=(CSRF_FIELD) value=(self.csrf_token);
                (self.button)
            }
        }
    }
}
