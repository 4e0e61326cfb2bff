use maud::{html, Markup};

/// One row of an outreach group table, already formatted for display.
pub struct RowVm {
    pub display_name: String,
    pub customer_id: String,
    pub seller_name: String,
    pub recency: i64,
    pub frequency: i64,
    pub value_display: String,
    pub first_purchase: String,
    pub last_purchase: String,
    pub current_segment: &'static str,
    pub previous_segment: &'static str,
    pub suggested_message: &'static str,
    pub whatsapp_link: Option<String>,
    pub message_sent: bool,
}

/// Table for one page of an outreach group. Checkboxes feed the
/// /messages/mark form; already-marked rows render checked and disabled.
pub fn segment_table(rows: &[RowVm]) -> Markup {
    html! {
        table class="segment-table" {
            thead {
                tr {
                    th { "Customer" }
                    th { "CNPJ" }
                    th { "Seller" }
                    th { "Recency" }
                    th { "Frequency" }
                    th { "Value" }
                    th { "1st purchase" }
                    th { "Last purchase" }
                    th { "Segment (M0)" }
                    th { "Segment (M-1)" }
                    th { "Suggestion" }
                    th { "WhatsApp" }
                    th { "Sent?" }
                }
            }
            tbody {
                @for row in rows {
                    tr {
                        td { (row.display_name) }
                        td { (row.customer_id) }
                        td { (row.seller_name) }
                        td { (row.recency) }
                        td { (row.frequency) }
                        td { (row.value_display) }
                        td { (row.first_purchase) }
                        td { (row.last_purchase) }
                        td { (row.current_segment) }
                        td { (row.previous_segment) }
                        td { (row.suggested_message) }
                        td {
                            @if let Some(link) = &row.whatsapp_link {
                                a href=(link) target="_blank" { "Open chat" }
                            }
                        }
                        td {
                            @if row.message_sent {
                                input type="checkbox" checked disabled;
                            } @else {
                                input type="checkbox" name="cnpj" value=(row.customer_id);
                            }
                        }
                    }
                }
            }
        }
    }
}
