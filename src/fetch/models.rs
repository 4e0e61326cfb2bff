use serde::Deserialize;
use serde_json::Value;

// Raw API payloads. Everything is optional: the upstream omits fields freely
// and amounts arrive as either numbers or strings. Validation happens when
// these are converted for storage, not here.

#[derive(Debug, Deserialize)]
pub struct ApiOrder {
    #[serde(rename = "orderId")]
    pub order_id: Option<String>,
    #[serde(rename = "customerId")]
    pub customer_id: Option<String>,
    pub seller: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: Option<String>,
    #[serde(rename = "totalValue")]
    pub total_value: Option<Value>,
    pub status: Option<String>,
}

impl ApiOrder {
    /// Amounts come back as JSON numbers or quoted strings depending on the
    /// upstream's mood.
    pub fn net_value(&self) -> Option<f64> {
        match &self.total_value {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ApiCustomer {
    pub document: Option<String>,
    pub name: Option<String>,
    pub whatsapp: Option<String>,
    pub mobile: Option<String>,
    pub telefone: Option<String>,
}
