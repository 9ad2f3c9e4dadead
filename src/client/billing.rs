//! Invoices and payment profiles.

use serde_json::json;

use super::{QueryMode, WaldurClient};
use crate::endpoints::Endpoint;
use crate::error::Result;
use crate::http::OK;
use crate::models::{InvoiceState, PaymentProfileType, Resource};
use crate::query::Query;

impl WaldurClient {
    /// The invoice of a customer for one month.
    pub async fn get_invoice_for_customer(
        &self,
        customer_uuid: &str,
        year: i32,
        month: u32,
        state: Option<InvoiceState>,
    ) -> Result<Resource> {
        let query = Query::new()
            .with("customer_uuid", customer_uuid)
            .with("year", year)
            .with("month", month)
            .with_opt("state", state);
        self.query_resource(Endpoint::Invoices, query, QueryMode::Single)
            .await
    }

    async fn invoice_action(
        &self,
        invoice_uuid: &str,
        action: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<Resource> {
        self.action_with_status(Endpoint::Invoices, invoice_uuid, action, OK, body)
            .await
    }

    pub async fn invoice_set_backend_id(&self, invoice_uuid: &str, backend_id: &str) -> Result<Resource> {
        let body = json!({ "backend_id": backend_id });
        self.invoice_action(invoice_uuid, "set_backend_id", Some(&body))
            .await
    }

    pub async fn invoice_set_payment_url(&self, invoice_uuid: &str, payment_url: &str) -> Result<Resource> {
        let body = json!({ "payment_url": payment_url });
        self.invoice_action(invoice_uuid, "set_payment_url", Some(&body))
            .await
    }

    pub async fn invoice_set_reference_number(
        &self,
        invoice_uuid: &str,
        reference_number: &str,
    ) -> Result<Resource> {
        let body = json!({ "reference_number": reference_number });
        self.invoice_action(invoice_uuid, "set_reference_number", Some(&body))
            .await
    }

    pub async fn invoice_set_state_paid(&self, invoice_uuid: &str) -> Result<Resource> {
        self.invoice_action(invoice_uuid, "paid", None).await
    }

    pub async fn list_invoice_items(&self, filters: Query) -> Result<Resource> {
        self.list(Endpoint::InvoiceItems, filters).await
    }

    pub async fn list_payment_profiles(
        &self,
        filters: Query,
        payment_type: Option<PaymentProfileType>,
    ) -> Result<Resource> {
        let mut filters = filters;
        if let Some(payment_type) = payment_type {
            filters.set("payment_type", payment_type);
        }
        self.list(Endpoint::PaymentProfiles, filters).await
    }
}

#[cfg(test)]
mod tests {
    use crate::models::{InvoiceState, PaymentProfileType};
    use crate::query::Query;
    use crate::test_utils::{API_PATH, client_for, path};
    use mockito::Matcher;
    use serde_json::json;

    #[tokio::test]
    async fn test_get_invoice_for_customer_filters_by_period() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", path("invoices/"))
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("customer_uuid".into(), "c1".into()),
                Matcher::UrlEncoded("year".into(), "2024".into()),
                Matcher::UrlEncoded("month".into(), "3".into()),
                Matcher::UrlEncoded("state".into(), "pending".into()),
            ]))
            .with_status(200)
            .with_body(r#"[{"uuid": "i1", "state": "pending"}]"#)
            .create_async()
            .await;

        let invoice = client_for(&server)
            .get_invoice_for_customer("c1", 2024, 3, Some(InvoiceState::Pending))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(invoice["uuid"], "i1");
    }

    #[tokio::test]
    async fn test_invoice_set_state_paid() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", format!("{API_PATH}/invoices/i1/paid/").as_str())
            .with_status(200)
            .create_async()
            .await;

        client_for(&server).invoice_set_state_paid("i1").await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_invoice_set_payment_url() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", format!("{API_PATH}/invoices/i1/set_payment_url/").as_str())
            .match_body(Matcher::Json(json!({"payment_url": "https://pay/i1"})))
            .with_status(200)
            .create_async()
            .await;

        client_for(&server)
            .invoice_set_payment_url("i1", "https://pay/i1")
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_payment_profiles_sends_payment_type_name() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", path("payment-profiles/"))
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("payment_type".into(), "invoices".into()),
                Matcher::UrlEncoded("organization_uuid".into(), "c1".into()),
            ]))
            .with_status(200)
            .with_body(r#"[{"name": "Monthly"}]"#)
            .create_async()
            .await;

        let profiles = client_for(&server)
            .list_payment_profiles(
                Query::new().with("organization_uuid", "c1"),
                Some(PaymentProfileType::MonthlyInvoices),
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(profiles[0]["name"], "Monthly");
    }
}
