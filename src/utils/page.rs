use crate::models::conversion::Conversion;

pub const FETCH_FAILED: &str = "Could not fetch conversion rate. Please try again later.";

/// What the converter page shows under the form.
pub enum Notice<'a> {
    None,
    Converted(&'a Conversion),
    Error(&'a str),
}

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, user: Option<&str>, body: &str) -> String {
    let nav = match user {
        Some(u) => format!(r#"<p class="who">Signed in as {} · <a href="/logout">Log out</a></p>"#, escape(u)),
        None => String::new(),
    };
    format!(
        "<!doctype html>\n<html><head><meta charset=\"utf-8\"><title>{}</title></head>\n<body>\n{}\n{}\n</body></html>\n",
        escape(title),
        nav,
        body
    )
}

fn money(symbol: Option<&str>, value: &str, code: &str) -> String {
    format!("{}{} {}", escape(symbol.unwrap_or("")), value, escape(code))
}

/// `action` is where the form posts: `/` without the login gate, `/convert` with it.
pub fn converter(user: Option<&str>, action: &str, notice: Notice<'_>) -> String {
    let result = match notice {
        Notice::None => String::new(),
        Notice::Error(msg) => format!(r#"<p class="error">{}</p>"#, escape(msg)),
        Notice::Converted(c) => format!(
            r#"<p class="result">{} = {}</p><p class="rate">1 {} = {} {}</p>"#,
            money(c.base_symbol.as_deref(), &c.amount.to_string(), &c.base_currency),
            money(
                c.target_symbol.as_deref(),
                &format!("{:.2}", c.converted_amount),
                &c.target_currency
            ),
            escape(&c.base_currency),
            c.rate,
            escape(&c.target_currency),
        ),
    };
    let form = format!(
        r#"<h1>Currency converter</h1>
<form method="post" action="{}">
  <label>From <input name="base_currency" placeholder="USD" required></label>
  <label>To <input name="target_currency" placeholder="EUR" required></label>
  <label>Amount <input name="amount" inputmode="decimal" required></label>
  <button type="submit">Convert</button>
</form>
{}"#,
        escape(action),
        result
    );
    layout("Currency converter", user, &form)
}

fn credentials_form(title: &str, action: &str, message: Option<&str>, alt: &str) -> String {
    let flash = message
        .map(|m| format!(r#"<p class="flash">{}</p>"#, escape(m)))
        .unwrap_or_default();
    let body = format!(
        r#"<h1>{}</h1>
{}
<form method="post" action="{}">
  <label>Username <input name="username" required></label>
  <label>Password <input name="password" type="password" required></label>
  <button type="submit">{}</button>
</form>
{}"#,
        escape(title),
        flash,
        action,
        escape(title),
        alt
    );
    layout(title, None, &body)
}

pub fn login(message: Option<&str>) -> String {
    credentials_form(
        "Log in",
        "/login",
        message,
        r#"<p>No account? <a href="/register">Register</a></p>"#,
    )
}

pub fn register(message: Option<&str>) -> String {
    credentials_form(
        "Register",
        "/register",
        message,
        r#"<p>Have an account? <a href="/login">Log in</a></p>"#,
    )
}
