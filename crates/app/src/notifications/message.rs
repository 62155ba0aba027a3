//! Delivery contents.

/// What the codes were issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryKind {
    Purchase { quantity: u32 },
    ReferralBonus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeDelivery {
    pub recipient: String,
    pub kind: DeliveryKind,
    pub codes: Vec<String>,
}

impl CodeDelivery {
    #[must_use]
    pub fn subject(&self) -> &'static str {
        match self.kind {
            DeliveryKind::Purchase { quantity: 1 } => "Your WakaTV Access Code",
            DeliveryKind::Purchase { .. } => "Your WakaTV Access Codes",
            DeliveryKind::ReferralBonus => "Your WakaTV Referral Reward",
        }
    }

    /// HTML body listing every code, one per line.
    #[must_use]
    pub fn html_body(&self, support_address: &str) -> String {
        let heading = match self.kind {
            DeliveryKind::Purchase { .. } => "Thanks for your purchase!",
            DeliveryKind::ReferralBonus => "You earned a referral reward!",
        };

        let mut body = format!("<h2>{heading}</h2>\n");

        if let DeliveryKind::Purchase { quantity } = self.kind {
            body.push_str(&format!("<p><strong>Quantity:</strong> {quantity}</p>\n"));
        }

        let label = if self.codes.len() == 1 {
            "Your Access Code"
        } else {
            "Your Access Codes"
        };

        body.push_str(&format!("<p><strong>{label}:</strong></p>\n<ul>\n"));

        for code in &self.codes {
            body.push_str(&format!("  <li><code>{}</code></li>\n", escape_html(code)));
        }

        body.push_str(&format!(
            "</ul>\n<p>Contact {} if you need help.</p>\n",
            escape_html(support_address)
        ));

        body
    }
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());

    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }

    escaped
}
