//! Server-rendered HTML: the login form, the success page and error pages.

use std::fmt::Write;

use crate::domain::schema::FieldSchema;

const STYLE: &str = "body{font-family:sans-serif;max-width:28rem;margin:4rem auto;padding:0 1rem}\
label{display:block;margin-top:1rem}input{width:100%;padding:.4rem}\
button{margin-top:1.5rem;padding:.5rem 1.5rem}.error{color:#b00020}";

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n{body}</body>\n</html>\n",
        title = html_escape(title),
    )
}

/// Escape text for use in element content and double-quoted attributes.
pub fn html_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn input_type(name: &str) -> &'static str {
    match name {
        "password" => "password",
        "email" => "email",
        _ => "text",
    }
}

fn label(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Login form posting to `/login`, one input per schema field.
pub fn login_page(schema: &FieldSchema) -> String {
    let mut body = String::from("<h1>Login</h1>\n<form method=\"post\" action=\"/login\">\n");
    for field in schema.fields() {
        let name = html_escape(&field.name);
        let _ = writeln!(
            body,
            "<label for=\"{name}\">{label}</label>\n<input id=\"{name}\" name=\"{name}\" type=\"{ty}\"{req}>",
            label = html_escape(&label(&field.name)),
            ty = input_type(&field.name),
            req = if field.required { " required" } else { "" },
        );
    }
    body.push_str("<button type=\"submit\">Log in</button>\n</form>\n");
    layout("Login", &body)
}

/// Static page behind `GET /success`.
pub fn success_page() -> String {
    layout(
        "Success",
        "<h1>Success</h1>\n<p>Your details were recorded.</p>\n<p><a href=\"/\">Back</a></p>\n",
    )
}

/// Confirmation rendered directly by `POST /login` in page mode.
pub fn confirmation_page(field: &str, value: &str) -> String {
    let body = format!(
        "<h1>Success</h1>\n<p>Thank you, <strong>{value}</strong>. Your {field} was recorded.</p>\n\
         <p><a href=\"/\">Back</a></p>\n",
        value = html_escape(value),
        field = html_escape(field),
    );
    layout("Success", &body)
}

pub fn error_page(message: &str) -> String {
    let body = format!(
        "<h1>Submission failed</h1>\n<p class=\"error\">{}</p>\n<p><a href=\"/\">Try again</a></p>\n",
        html_escape(message)
    );
    layout("Error", &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schema::FieldSpec;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            html_escape(r#"<script>alert("x")</script> & 'y'"#),
            "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt; &amp; &#x27;y&#x27;"
        );
        assert_eq!(html_escape("plain"), "plain");
    }

    #[test]
    fn login_page_follows_schema() {
        let page = login_page(&FieldSchema::login_default());
        assert!(page.contains("action=\"/login\""));
        assert!(page.contains("name=\"username\" type=\"text\" required"));
        assert!(page.contains("name=\"password\" type=\"password\" required"));

        let schema = FieldSchema::new(vec![
            FieldSpec::required("email"),
            FieldSpec::optional("name"),
        ])
        .unwrap();
        let page = login_page(&schema);
        assert!(page.contains("name=\"email\" type=\"email\" required"));
        assert!(page.contains("name=\"name\" type=\"text\">"));
        assert!(page.contains(">Email</label>"));
    }

    #[test]
    fn confirmation_escapes_echoed_value() {
        let page = confirmation_page("username", "<b>ada</b>");
        assert!(page.contains("&lt;b&gt;ada&lt;/b&gt;"));
        assert!(!page.contains("<b>ada</b>"));
    }
}
