use crate::students::repo_types::OverallStatus;

pub struct Rendered {
    pub subject: String,
    pub html: String,
    pub text: String,
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn login_credentials(name: &str, login_id: &str, password: &str, app_url: &str) -> Rendered {
    let text = format!(
        "Dear {name},\n\n\
         You are eligible for placement and your account is now active.\n\n\
         Login URL: {app_url}\n\
         Login ID: {login_id}\n\
         Password: {password}\n\n\
         Please change your password after your first login.\n"
    );
    let html = format!(
        "<p>Dear {},</p>\
         <p>You are eligible for placement and your account is now active.</p>\
         <p>Login URL: <a href=\"{}\">{}</a><br/>Login ID: <b>{}</b><br/>Password: <b>{}</b></p>\
         <p>Please change your password after your first login.</p>",
        escape(name),
        escape(app_url),
        escape(app_url),
        escape(login_id),
        escape(password),
    );
    Rendered {
        subject: "Your placement portal login credentials".into(),
        html,
        text,
    }
}

pub fn existing_credentials(name: &str, login_id: &str, app_url: &str) -> Rendered {
    let text = format!(
        "Dear {name},\n\n\
         You are eligible for placement. Please sign in with your existing credentials.\n\n\
         Login URL: {app_url}\n\
         Login ID: {login_id}\n"
    );
    let html = format!(
        "<p>Dear {},</p>\
         <p>You are eligible for placement. Please sign in with your existing credentials.</p>\
         <p>Login URL: <a href=\"{}\">{}</a><br/>Login ID: <b>{}</b></p>",
        escape(name),
        escape(app_url),
        escape(app_url),
        escape(login_id),
    );
    Rendered {
        subject: "You are eligible for placement".into(),
        html,
        text,
    }
}

fn status_label(status: OverallStatus) -> &'static str {
    match status {
        OverallStatus::Eligible => "Eligible",
        OverallStatus::Override => "Eligible (override approved)",
        OverallStatus::NotEligible => "Not eligible",
        OverallStatus::Pending => "Pending review",
    }
}

pub fn eligibility_status(name: &str, status: OverallStatus, note: Option<&str>) -> Rendered {
    let label = status_label(status);
    let note = note.map(str::trim).filter(|n| !n.is_empty());

    let mut text = format!("Dear {name},\n\nYour placement eligibility status is: {label}.\n");
    let mut html = format!(
        "<p>Dear {},</p><p>Your placement eligibility status is: <b>{}</b>.</p>",
        escape(name),
        label
    );
    if let Some(note) = note {
        text.push_str(&format!("\nNotes: {note}\n"));
        html.push_str(&format!("<p>Notes: {}</p>", escape(note)));
    }
    Rendered {
        subject: format!("Placement eligibility update: {label}"),
        html,
        text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_mail_carries_password_and_url() {
        let r = login_credentials("Ada", "ada@example.com", "Xy7!abcdEFGH", "https://portal.local");
        assert!(r.text.contains("Xy7!abcdEFGH"));
        assert!(r.text.contains("https://portal.local"));
        assert!(r.html.contains("ada@example.com"));
    }

    #[test]
    fn html_is_escaped() {
        let r = existing_credentials("<script>", "a@b.com", "https://x");
        assert!(!r.html.contains("<script>"));
        assert!(r.html.contains("&lt;script&gt;"));
    }

    #[test]
    fn status_mail_includes_note_when_present() {
        let r = eligibility_status("Ada", OverallStatus::NotEligible, Some("fees unpaid"));
        assert!(r.subject.contains("Not eligible"));
        assert!(r.text.contains("fees unpaid"));

        let r = eligibility_status("Ada", OverallStatus::Pending, Some("   "));
        assert!(!r.text.contains("Notes"));
    }
}
