use serde::Serialize;

use super::{Params, PAGE_KEYS};
use crate::client::{ApiClient, ApiResponse};
use crate::error::ApiError;
use crate::query::append_query;

/// The `action` a ticket update carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketAction {
    Extend,
    Schedule,
    Assign,
    Optin,
    Cancel,
    /// Field edits; sent as `edit`.
    Update,
}

impl TicketAction {
    pub fn as_str(self) -> &'static str {
        match self {
            TicketAction::Extend => "extend",
            TicketAction::Schedule => "schedule",
            TicketAction::Assign => "assign",
            TicketAction::Optin => "optin",
            TicketAction::Cancel => "cancel",
            TicketAction::Update => "edit",
        }
    }
}

/// Ticket endpoints.
///
/// Every method takes a camelCase (or snake_case) parameter object. The id
/// keys named in each method's path are required; a missing one fails with
/// `ApiError::Validation` before anything is sent.
pub struct Tickets<'a> {
    client: &'a ApiClient,
}

impl<'a> Tickets<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// POST `/v1/groups/{groupId}/tickets/search?v2=1`, with
    /// `dashboardVisible` and the page keys in the query and the search
    /// criteria as the body.
    pub async fn search_by_group<P: Serialize + ?Sized>(&self, params: &P) -> Result<ApiResponse, ApiError> {
        let mut params = Params::from_serialize(params)?;
        let group_id = params.path_param("groupId")?;
        let query = params.split_query(&["dashboardVisible", "limit", "offset", "sortField", "sortOrder"]);
        let path = append_query(&format!("/v1/groups/{group_id}/tickets/search?v2=1"), &query);
        self.client.post(&path, Some(params.into_body())).await
    }

    /// Tickets assigned to the current user.
    pub async fn get<P: Serialize + ?Sized>(&self, params: &P) -> Result<ApiResponse, ApiError> {
        let params = Params::from_serialize(params)?;
        self.client.get(&format!("/v1/tickets/my_list{}", params.into_query())).await
    }

    pub async fn get_for_customer<P: Serialize + ?Sized>(&self, params: &P) -> Result<ApiResponse, ApiError> {
        let mut params = Params::from_serialize(params)?;
        let customer_id = params.path_param("customerId")?;
        self.client
            .get(&format!("/v1/customers/{customer_id}/tickets{}", params.into_query()))
            .await
    }

    /// Full-text search within an organization. Page keys go in the query;
    /// `queryString`, `sort`, and `filters` go in the body.
    pub async fn search<P: Serialize + ?Sized>(&self, params: &P) -> Result<ApiResponse, ApiError> {
        let mut params = Params::from_serialize(params)?;
        let organization_id = params.path_param("organizationId")?;
        let query = params.split_query(&PAGE_KEYS);
        self.client
            .post(
                &format!("/v2/organizations/{organization_id}/search/tickets{query}"),
                Some(params.into_body()),
            )
            .await
    }

    /// Facet counts for the same criteria [`Tickets::search`] accepts.
    pub async fn search_filters<P: Serialize + ?Sized>(&self, params: &P) -> Result<ApiResponse, ApiError> {
        let mut params = Params::from_serialize(params)?;
        let organization_id = params.path_param("organizationId")?;
        let query = params.split_query(&PAGE_KEYS);
        self.client
            .post(
                &format!("/v2/organizations/{organization_id}/search/tickets/filters{query}"),
                Some(params.into_body()),
            )
            .await
    }

    pub async fn get_by_id<P: Serialize + ?Sized>(&self, params: &P) -> Result<ApiResponse, ApiError> {
        let mut params = Params::from_serialize(params)?;
        let ticket_id = params.path_param("ticketId")?;
        self.client
            .get(&format!("/v1/tickets/{ticket_id}{}", params.into_query()))
            .await
    }

    pub async fn create_data_item<P: Serialize + ?Sized>(&self, params: &P) -> Result<ApiResponse, ApiError> {
        let mut params = Params::from_serialize(params)?;
        let ticket_id = params.path_param("ticketId")?;
        self.client
            .post(&format!("/v1/tickets/{ticket_id}/data_items"), Some(params.into_body()))
            .await
    }

    pub async fn delete_data_item<P: Serialize + ?Sized>(&self, params: &P) -> Result<ApiResponse, ApiError> {
        let mut params = Params::from_serialize(params)?;
        let ticket_id = params.path_param("ticketId")?;
        let data_item_id = params.path_param("dataItemId")?;
        self.client
            .delete(&format!("/v1/tickets/{ticket_id}/data_items/{data_item_id}"))
            .await
    }

    pub async fn clone_ticket<P: Serialize + ?Sized>(&self, params: &P) -> Result<ApiResponse, ApiError> {
        let mut params = Params::from_serialize(params)?;
        let ticket_id = params.path_param("ticketId")?;
        self.client.post(&format!("/v1/tickets/{ticket_id}/clone"), None).await
    }

    pub async fn submit<P: Serialize + ?Sized>(&self, params: &P) -> Result<ApiResponse, ApiError> {
        let mut params = Params::from_serialize(params)?;
        let ticket_id = params.path_param("ticketId")?;
        self.client.post(&format!("/v1/tickets/{ticket_id}/submit"), None).await
    }

    /// PUT `/v1/tickets/{ticketId}` with the remaining keys plus `action`.
    pub async fn perform<P: Serialize + ?Sized>(
        &self,
        action: TicketAction,
        params: &P,
    ) -> Result<ApiResponse, ApiError> {
        let mut params = Params::from_serialize(params)?;
        let ticket_id = params.path_param("ticketId")?;
        let body = params.with_action(action.as_str()).into_body();
        self.client.put(&format!("/v1/tickets/{ticket_id}"), Some(body)).await
    }

    /// PUT `/v1/tickets` applying `action` to every ticket the parameters
    /// name.
    pub async fn perform_all<P: Serialize + ?Sized>(
        &self,
        action: TicketAction,
        params: &P,
    ) -> Result<ApiResponse, ApiError> {
        let body = Params::from_serialize(params)?.with_action(action.as_str()).into_body();
        self.client.put("/v1/tickets", Some(body)).await
    }

    pub async fn extend<P: Serialize + ?Sized>(&self, params: &P) -> Result<ApiResponse, ApiError> {
        self.perform(TicketAction::Extend, params).await
    }

    pub async fn schedule<P: Serialize + ?Sized>(&self, params: &P) -> Result<ApiResponse, ApiError> {
        self.perform(TicketAction::Schedule, params).await
    }

    pub async fn assign<P: Serialize + ?Sized>(&self, params: &P) -> Result<ApiResponse, ApiError> {
        self.perform(TicketAction::Assign, params).await
    }

    pub async fn optin<P: Serialize + ?Sized>(&self, params: &P) -> Result<ApiResponse, ApiError> {
        self.perform(TicketAction::Optin, params).await
    }

    pub async fn cancel<P: Serialize + ?Sized>(&self, params: &P) -> Result<ApiResponse, ApiError> {
        self.perform(TicketAction::Cancel, params).await
    }

    pub async fn update<P: Serialize + ?Sized>(&self, params: &P) -> Result<ApiResponse, ApiError> {
        self.perform(TicketAction::Update, params).await
    }

    pub async fn extend_all<P: Serialize + ?Sized>(&self, params: &P) -> Result<ApiResponse, ApiError> {
        self.perform_all(TicketAction::Extend, params).await
    }

    pub async fn schedule_all<P: Serialize + ?Sized>(&self, params: &P) -> Result<ApiResponse, ApiError> {
        self.perform_all(TicketAction::Schedule, params).await
    }

    pub async fn assign_all<P: Serialize + ?Sized>(&self, params: &P) -> Result<ApiResponse, ApiError> {
        self.perform_all(TicketAction::Assign, params).await
    }

    pub async fn optin_all<P: Serialize + ?Sized>(&self, params: &P) -> Result<ApiResponse, ApiError> {
        self.perform_all(TicketAction::Optin, params).await
    }

    pub async fn cancel_all<P: Serialize + ?Sized>(&self, params: &P) -> Result<ApiResponse, ApiError> {
        self.perform_all(TicketAction::Cancel, params).await
    }

    pub async fn update_all<P: Serialize + ?Sized>(&self, params: &P) -> Result<ApiResponse, ApiError> {
        self.perform_all(TicketAction::Update, params).await
    }

    pub async fn get_all<P: Serialize + ?Sized>(&self, params: &P) -> Result<ApiResponse, ApiError> {
        let params = Params::from_serialize(params)?;
        self.client.get(&format!("/v1/tickets{}", params.into_query())).await
    }

    pub async fn get_by_organization<P: Serialize + ?Sized>(&self, params: &P) -> Result<ApiResponse, ApiError> {
        let mut params = Params::from_serialize(params)?;
        let organization_id = params.path_param("organizationId")?;
        self.client
            .get(&format!("/v1/organizations/{organization_id}/tickets{}", params.into_query()))
            .await
    }

    pub async fn search_by_organization<P: Serialize + ?Sized>(&self, params: &P) -> Result<ApiResponse, ApiError> {
        let mut params = Params::from_serialize(params)?;
        let organization_id = params.path_param("organizationId")?;
        let query = params.split_query(&["showCustomerMetadata", "limit", "offset", "sortField", "sortOrder"]);
        self.client
            .post(
                &format!("/v1/organizations/{organization_id}/tickets/search{query}"),
                Some(params.into_body()),
            )
            .await
    }

    pub async fn get_by_subscription<P: Serialize + ?Sized>(&self, params: &P) -> Result<ApiResponse, ApiError> {
        let mut params = Params::from_serialize(params)?;
        let subscription_id = params.path_param("subscriptionId")?;
        self.client
            .get(&format!("/v1/subscriptions/{subscription_id}/tickets{}", params.into_query()))
            .await
    }

    pub async fn search_by_subscription<P: Serialize + ?Sized>(&self, params: &P) -> Result<ApiResponse, ApiError> {
        let mut params = Params::from_serialize(params)?;
        let subscription_id = params.path_param("subscriptionId")?;
        let query = params.split_query(&["showCustomerMetadata", "limit", "offset", "sortField", "sortOrder"]);
        self.client
            .post(
                &format!("/v1/subscriptions/{subscription_id}/tickets/search{query}"),
                Some(params.into_body()),
            )
            .await
    }

    /// Open tickets near a location, for the map view.
    pub async fn get_ticket_map<P: Serialize + ?Sized>(&self, params: &P) -> Result<ApiResponse, ApiError> {
        let params = Params::from_serialize(params)?;
        self.client.get(&format!("/v1/ticket_map{}", params.into_query())).await
    }

    pub async fn get_metadata<P: Serialize + ?Sized>(&self, params: &P) -> Result<ApiResponse, ApiError> {
        let mut params = Params::from_serialize(params)?;
        let ticket_id = params.path_param("ticketId")?;
        self.client.get(&format!("/v1/tickets/{ticket_id}/metadata")).await
    }

    pub async fn create_metadata<P: Serialize + ?Sized>(&self, params: &P) -> Result<ApiResponse, ApiError> {
        let mut params = Params::from_serialize(params)?;
        let ticket_id = params.path_param("ticketId")?;
        self.client
            .post(&format!("/v1/tickets/{ticket_id}/metadata"), Some(params.into_body()))
            .await
    }

    pub async fn update_metadata<P: Serialize + ?Sized>(&self, params: &P) -> Result<ApiResponse, ApiError> {
        let mut params = Params::from_serialize(params)?;
        let ticket_id = params.path_param("ticketId")?;
        self.client
            .put(&format!("/v1/tickets/{ticket_id}/metadata"), Some(params.into_body()))
            .await
    }

    pub async fn get_events<P: Serialize + ?Sized>(&self, params: &P) -> Result<ApiResponse, ApiError> {
        let mut params = Params::from_serialize(params)?;
        let ticket_id = params.path_param("ticketId")?;
        self.client
            .get(&format!("/v1/tickets/{ticket_id}/events{}", params.into_query()))
            .await
    }

    pub async fn create_event<P: Serialize + ?Sized>(&self, params: &P) -> Result<ApiResponse, ApiError> {
        let mut params = Params::from_serialize(params)?;
        let ticket_id = params.path_param("ticketId")?;
        self.client
            .post(&format!("/v1/tickets/{ticket_id}/events"), Some(params.into_body()))
            .await
    }

    pub async fn delete_event<P: Serialize + ?Sized>(&self, params: &P) -> Result<ApiResponse, ApiError> {
        let mut params = Params::from_serialize(params)?;
        let ticket_event_id = params.path_param("ticketEventId")?;
        self.client.delete(&format!("/v1/ticket_events/{ticket_event_id}")).await
    }

    pub async fn get_applications<P: Serialize + ?Sized>(&self, params: &P) -> Result<ApiResponse, ApiError> {
        let params = Params::from_serialize(params)?;
        self.client
            .get(&format!("/v1/ticket_applications{}", params.into_query()))
            .await
    }

    pub async fn get_applications_for_customer<P: Serialize + ?Sized>(
        &self,
        params: &P,
    ) -> Result<ApiResponse, ApiError> {
        let mut params = Params::from_serialize(params)?;
        let customer_id = params.path_param("customerId")?;
        self.client
            .get(&format!("/v1/customers/{customer_id}/applications{}", params.into_query()))
            .await
    }

    pub async fn get_application<P: Serialize + ?Sized>(&self, params: &P) -> Result<ApiResponse, ApiError> {
        let mut params = Params::from_serialize(params)?;
        let customer_id = params.path_param("customerId")?;
        let ticket_id = params.path_param("ticketId")?;
        self.client
            .get(&format!("/v1/customers/{customer_id}/applications/{ticket_id}"))
            .await
    }

    pub async fn get_applicants<P: Serialize + ?Sized>(&self, params: &P) -> Result<ApiResponse, ApiError> {
        let mut params = Params::from_serialize(params)?;
        let ticket_id = params.path_param("ticketId")?;
        self.client.get(&format!("/v1/tickets/{ticket_id}/applicants")).await
    }

    /// Apply the current user to a ticket. Extra keys travel in the query.
    pub async fn apply<P: Serialize + ?Sized>(&self, params: &P) -> Result<ApiResponse, ApiError> {
        let mut params = Params::from_serialize(params)?;
        let ticket_id = params.path_param("ticketId")?;
        self.client
            .post(&format!("/v1/tickets/{ticket_id}/applicants{}", params.into_query()), None)
            .await
    }

    pub async fn withdraw<P: Serialize + ?Sized>(&self, params: &P) -> Result<ApiResponse, ApiError> {
        let mut params = Params::from_serialize(params)?;
        let ticket_id = params.path_param("ticketId")?;
        self.client.delete(&format!("/v1/tickets/{ticket_id}/applicants")).await
    }

    /// Remove the listed applicants from a ticket.
    pub async fn withdraw_all<P: Serialize + ?Sized>(&self, params: &P) -> Result<ApiResponse, ApiError> {
        let mut params = Params::from_serialize(params)?;
        let ticket_id = params.path_param("ticketId")?;
        let body = params.with_action("remove").into_body();
        self.client
            .put(&format!("/v1/tickets/{ticket_id}/applicants"), Some(body))
            .await
    }
}
