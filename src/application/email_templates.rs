use url::Url;

use crate::domain::entities::verification_token::TOKEN_TTL_MINUTES;

fn origin_label(app_origin: &Url) -> String {
    app_origin
        .host_str()
        .map(|host| host.to_string())
        .unwrap_or_else(|| app_origin.to_string())
}

/// `<origin>/verify-email?token=<token>`, with the token query-encoded.
pub fn verification_link(app_origin: &Url, token: &str) -> Url {
    let mut link = app_origin.clone();
    link.set_path("/verify-email");
    link.set_fragment(None);
    link.query_pairs_mut().clear().append_pair("token", token);
    link
}

pub fn primary_button(url: &str, label: &str) -> String {
    format!(
        r#"<a href="{url}" style="display:inline-block;padding:12px 18px;background-color:#7c3aed;color:#ffffff;text-decoration:none;border-radius:8px;font-weight:600;">{label}</a>"#
    )
}

pub fn verification_email(app_origin: &Url, site_name: &str, link: &Url) -> (String, String) {
    let subject = format!("Verify your email for {}", site_name);
    let headline = "Confirm your email address";
    let lead = format!(
        "Thanks for signing up to <strong>{}</strong>. Confirm your email to register teams and join tournaments.",
        site_name
    );
    let button = primary_button(link.as_str(), "Verify email");
    let body = format!(
        r#"{button}<p style="margin:12px 0 0;color:#374151;">This link expires in {TOKEN_TTL_MINUTES} minutes and can only be used once.</p>
        <p style="margin:12px 0 0;color:#6b7280;font-size:13px;word-break:break-all;">{link}</p>"#,
    );
    let reason = format!("you created an account on {}", site_name);

    let html = wrap_email(app_origin, site_name, headline, &lead, &body, &reason);
    (subject, html)
}

pub fn wrap_email(
    app_origin: &Url,
    brand: &str,
    headline: &str,
    lead: &str,
    body_html: &str,
    reason: &str,
) -> String {
    let origin = origin_label(app_origin);
    let reason_label = "Why you got this email";
    let ignore_line = "If you didn't request this, you can safely ignore it.";

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
  <body style="background:#0f172a;margin:0;padding:24px;font-family:Arial,Helvetica,sans-serif;">
    <div style="max-width:560px;margin:0 auto;background:#ffffff;border:1px solid #e5e7eb;border-radius:12px;padding:24px;">
      <div style="font-size:12px;letter-spacing:0.08em;text-transform:uppercase;color:#6b7280;">{brand} - {origin}</div>
      <h1 style="margin:12px 0 8px;font-size:22px;color:#111827;">{headline}</h1>
      <p style="margin:0 0 12px;font-size:15px;color:#111827;line-height:1.6;">{lead}</p>
      {body_html}
      <div style="margin-top:20px;padding-top:16px;border-top:1px solid #e5e7eb;">
        <p style="margin:0 0 6px;font-size:13px;color:#4b5563;">{reason_label}: {reason}.</p>
        <p style="margin:0;font-size:13px;color:#4b5563;">{ignore_line}</p>
      </div>
    </div>
  </body>
</html>
"#,
    )
}
