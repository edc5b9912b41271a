//! Form components for maud templates.
//!
//! This module provides reusable form components that match the styles
//! defined in `static/css/style.css`.

use maud::{html, Markup, Render};

use super::alert::ErrorList;
use crate::auth::csrf::CSRF_FIELD;

/// A form container element.
#[derive(Debug)]
pub struct Form<'a> {
    pub action: &'a str,
    /// HTTP method ("get" or "post")
    pub method: &'a str,
    pub content: Markup,
    pub class: Option<&'a str>,
    /// Enable multipart/form-data encoding
    pub multipart: bool,
}

impl<'a> Form<'a> {
    #[must_use]
    pub fn new(action: &'a str, method: &'a str, content: Markup) -> Self {
        Self {
            action,
            method,
            content,
            class: None,
            multipart: false,
        }
    }

    #[must_use]
    pub fn post(action: &'a str, content: Markup) -> Self {
        Self::new(action, "post", content)
    }

    #[must_use]
    pub fn class(mut self, class: &'a str) -> Self {
        self.class = Some(class);
        self
    }

    /// Enable multipart/form-data encoding (for file uploads).
    #[must_use]
    pub fn multipart(mut self) -> Self {
        self.multipart = true;
        self
    }
}

impl Render for Form<'_> {
    fn render(&self) -> Markup {
        html! {
            form
                action=(self.action)
                method=(self.method)
                class=[self.class]
                enctype=[self.multipart.then_some("multipart/form-data")]
            {
                (self.content)
            }
        }
    }
}

/// Hidden field carrying the session's CSRF token.
#[derive(Debug, Clone, Copy)]
pub struct CsrfField<'a>(pub &'a str);

impl Render for CsrfField<'_> {
    fn render(&self) -> Markup {
        html! {
            input type="hidden" name=(CSRF_FIELD) value=(self.0);
        }
    }
}

/// An input element.
#[derive(Debug, Clone)]
pub struct Input<'a> {
    pub name: &'a str,
    /// Input type ("text", "password", "email", "hidden", etc.)
    pub r#type: &'a str,
    pub value: Option<&'a str>,
    pub placeholder: Option<&'a str>,
    pub required: bool,
    pub autocomplete: Option<&'a str>,
    pub maxlength: Option<usize>,
}

impl<'a> Input<'a> {
    #[must_use]
    pub fn new(name: &'a str, r#type: &'a str) -> Self {
        Self {
            name,
            r#type,
            value: None,
            placeholder: None,
            required: false,
            autocomplete: None,
            maxlength: None,
        }
    }

    #[must_use]
    pub fn text(name: &'a str) -> Self {
        Self::new(name, "text")
    }

    #[must_use]
    pub fn password(name: &'a str) -> Self {
        Self::new(name, "password")
    }

    #[must_use]
    pub fn email(name: &'a str) -> Self {
        Self::new(name, "email")
    }

    #[must_use]
    pub fn hidden(name: &'a str, value: &'a str) -> Self {
        Self::new(name, "hidden").value(value)
    }

    #[must_use]
    pub fn value(mut self, value: &'a str) -> Self {
        self.value = Some(value);
        self
    }

    #[must_use]
    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn autocomplete(mut self, autocomplete: &'a str) -> Self {
        self.autocomplete = Some(autocomplete);
        self
    }

    #[must_use]
    pub fn maxlength(mut self, maxlength: usize) -> Self {
        self.maxlength = Some(maxlength);
        self
    }
}

impl Render for Input<'_> {
    fn render(&self) -> Markup {
        html! {
            input
                type=(self.r#type)
                name=(self.name)
                id=(format!("id_{}", self.name))
                value=[self.value]
                placeholder=[self.placeholder]
                required[self.required]
                autocomplete=[self.autocomplete]
                maxlength=[self.maxlength];
        }
    }
}

/// A textarea element.
#[derive(Debug)]
pub struct TextArea<'a> {
    pub name: &'a str,
    pub value: Option<&'a str>,
    pub rows: u32,
    pub required: bool,
}

impl<'a> TextArea<'a> {
    #[must_use]
    pub fn new(name: &'a str) -> Self {
        Self {
            name,
            value: None,
            rows: 10,
            required: false,
        }
    }

    #[must_use]
    pub fn value(mut self, value: &'a str) -> Self {
        self.value = Some(value);
        self
    }

    #[must_use]
    pub fn rows(mut self, rows: u32) -> Self {
        self.rows = rows;
        self
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

impl Render for TextArea<'_> {
    fn render(&self) -> Markup {
        html! {
            textarea
                name=(self.name)
                id=(format!("id_{}", self.name))
                rows=(self.rows)
                required[self.required]
            {
                (self.value.unwrap_or_default())
            }
        }
    }
}

/// A select element. The first option is always the empty choice.
#[derive(Debug)]
pub struct Select<'a> {
    pub name: &'a str,
    pub options: Vec<SelectOption<'a>>,
    pub selected: Option<&'a str>,
    pub empty_label: &'a str,
}

impl<'a> Select<'a> {
    #[must_use]
    pub fn new(name: &'a str) -> Self {
        Self {
            name,
            options: Vec::new(),
            selected: None,
            empty_label: "---------",
        }
    }

    #[must_use]
    pub fn option(mut self, value: &'a str, label: &'a str) -> Self {
        self.options.push(SelectOption { value, label });
        self
    }

    #[must_use]
    pub fn selected_opt(mut self, selected: Option<&'a str>) -> Self {
        self.selected = selected;
        self
    }
}

impl Render for Select<'_> {
    fn render(&self) -> Markup {
        html! {
            select name=(self.name) id=(format!("id_{}", self.name)) {
                option value="" selected[self.selected.map_or(true, str::is_empty)] {
                    (self.empty_label)
                }
                @for opt in &self.options {
                    option value=(opt.value) selected[self.selected == Some(opt.value)] {
                        (opt.label)
                    }
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SelectOption<'a> {
    pub value: &'a str,
    pub label: &'a str,
}

/// File upload input, restricted to images.
#[derive(Debug, Clone, Copy)]
pub struct FileInput<'a> {
    pub name: &'a str,
}

impl<'a> FileInput<'a> {
    #[must_use]
    pub const fn image(name: &'a str) -> Self {
        Self { name }
    }
}

impl Render for FileInput<'_> {
    fn render(&self) -> Markup {
        html! {
            input
                type="file"
                name=(self.name)
                id=(format!("id_{}", self.name))
                accept="image/png,image/jpeg,image/gif";
        }
    }
}

/// A checkbox with an inline label.
#[derive(Debug)]
pub struct Checkbox<'a> {
    pub name: &'a str,
    pub label: &'a str,
    pub checked: bool,
}

impl<'a> Checkbox<'a> {
    #[must_use]
    pub fn new(name: &'a str, label: &'a str) -> Self {
        Self {
            name,
            label,
            checked: false,
        }
    }
}

impl Render for Checkbox<'_> {
    fn render(&self) -> Markup {
        html! {
            label {
                input type="checkbox" name=(self.name) value="on" checked[self.checked];
                " "
                (self.label)
            }
        }
    }
}

/// Label, control, help text and validation messages for one field.
#[derive(Debug)]
pub struct FormGroup<'a> {
    pub label: &'a str,
    /// Field name; the control is expected to have id `id_{name}`.
    pub name: &'a str,
    pub input: Markup,
    pub help: Option<&'a str>,
    pub errors: &'a [String],
}

impl<'a> FormGroup<'a> {
    #[must_use]
    pub fn new(label: &'a str, name: &'a str, input: Markup) -> Self {
        Self {
            label,
            name,
            input,
            help: None,
            errors: &[],
        }
    }

    #[must_use]
    pub fn help(mut self, help: &'a str) -> Self {
        self.help = Some(help);
        self
    }

    #[must_use]
    pub fn errors(mut self, errors: &'a [String]) -> Self {
        self.errors = errors;
        self
    }
}

impl Render for FormGroup<'_> {
    fn render(&self) -> Markup {
        html! {
            div class=(if self.errors.is_empty() { "form-group" } else { "form-group has-error" }) {
                label for=(format!("id_{}", self.name)) { (self.label) }
                (self.input)
                (ErrorList::new(self.errors))
                @if let Some(help) = self.help {
                    small { (help) }
                }
            }
        }
    }
}
