//! Item HTTP handlers.
//!
//! ```text
//! GET|POST   /items/insert/{ownerId}/{title}/{description}/{cost}
//! GET|DELETE /items/delete/{itemId}
//! GET        /items/all
//! GET        /items/{ownerId}
//! ```
//!
//! Parameters are captured as one path tail and split by
//! [`path_params`](super::validation::path_params) so that missing segments
//! yield the 400 envelope rather than falling through to the unmatched route.

use std::str::FromStr;

use actix_web::{HttpRequest, HttpResponse, web};

use crate::domain::{Cost, Error, ItemDescription, ItemId, ItemTitle, NewItem, OwnerId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::envelope::{FailureEnvelope, ItemEnvelope, ItemsEnvelope, MessageEnvelope};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    Arity, FieldName, parameter_error, path_params, unmatched_route_error,
};

/// Name of the match-info slot holding the parameter tail.
const PARAMS: &str = "params";

const OWNER_ID: FieldName = FieldName::new("ownerId");
const TITLE: FieldName = FieldName::new("title");
const DESCRIPTION: FieldName = FieldName::new("description");
const COST: FieldName = FieldName::new("cost");
const ITEM_ID: FieldName = FieldName::new("itemId");

const INSERT_FIELDS: [FieldName; 4] = [OWNER_ID, TITLE, DESCRIPTION, COST];

/// Message returned after a delete, whether or not the item existed.
pub const ITEM_DELETED_MESSAGE: &str = "Item deleted";

fn params_tail(request: &HttpRequest) -> &str {
    request.match_info().get(PARAMS).unwrap_or("")
}

fn parse_new_item(values: Vec<String>) -> Result<NewItem, Error> {
    let [owner, title, description, cost]: [String; 4] =
        values.try_into().map_err(|_| unmatched_route_error())?;
    let arity = Arity::Multiple;

    Ok(NewItem {
        owner_id: OwnerId::new(owner.as_str())
            .map_err(|err| parameter_error(arity, OWNER_ID, &owner, &err))?,
        title: ItemTitle::new(title.as_str())
            .map_err(|err| parameter_error(arity, TITLE, &title, &err))?,
        description: ItemDescription::new(description.as_str())
            .map_err(|err| parameter_error(arity, DESCRIPTION, &description, &err))?,
        cost: Cost::from_str(&cost).map_err(|err| parameter_error(arity, COST, &cost, &err))?,
    })
}

fn single_param(request: &HttpRequest, field: FieldName) -> Result<String, Error> {
    path_params(params_tail(request), &[field], Arity::Single)?
        .pop()
        .ok_or_else(unmatched_route_error)
}

/// Create an item and schedule its search-index upsert.
#[utoipa::path(
    method(get, post),
    path = "/items/insert/{ownerId}/{title}/{description}/{cost}",
    description = "Create an item. The search index is updated asynchronously.",
    params(
        ("ownerId" = String, Path, description = "Owning user"),
        ("title" = String, Path, description = "Item title"),
        ("description" = String, Path, description = "Item description"),
        ("cost" = String, Path, description = "Non-negative decimal with at most two fraction digits", example = "10.50")
    ),
    responses(
        (status = 200, description = "Item created", body = ItemEnvelope),
        (status = 400, description = "Missed or invalid parameter(s)", body = FailureEnvelope),
        (status = 500, description = "Internal server error", body = FailureEnvelope),
        (status = 503, description = "Item store unavailable", body = FailureEnvelope)
    ),
    tags = ["items"],
    operation_id = "insertItem"
)]
pub async fn insert_item(
    state: web::Data<HttpState>,
    request: HttpRequest,
) -> ApiResult<HttpResponse> {
    let values = path_params(params_tail(&request), &INSERT_FIELDS, Arity::Multiple)?;
    let new_item = parse_new_item(values)?;
    let item = state.items.insert_item(new_item).await?;
    Ok(HttpResponse::Ok().json(ItemEnvelope::ok(item)))
}

/// Delete an item and schedule its removal from the search index.
#[utoipa::path(
    method(get, delete),
    path = "/items/delete/{itemId}",
    description = "Delete an item. Unknown identifiers succeed.",
    params(("itemId" = String, Path, description = "Item identifier (UUID)")),
    responses(
        (status = 200, description = "Item deleted", body = MessageEnvelope),
        (status = 400, description = "Missed or invalid parameter", body = FailureEnvelope),
        (status = 500, description = "Internal server error", body = FailureEnvelope),
        (status = 503, description = "Item store unavailable", body = FailureEnvelope)
    ),
    tags = ["items"],
    operation_id = "deleteItem"
)]
pub async fn delete_item(
    state: web::Data<HttpState>,
    request: HttpRequest,
) -> ApiResult<HttpResponse> {
    let raw = single_param(&request, ITEM_ID)?;
    let id = ItemId::from_str(&raw)
        .map_err(|err| parameter_error(Arity::Single, ITEM_ID, &raw, &err))?;
    state.items.delete_item(&id).await?;
    Ok(HttpResponse::Ok().json(MessageEnvelope::ok(ITEM_DELETED_MESSAGE)))
}

/// List every item.
#[utoipa::path(
    get,
    path = "/items/all",
    responses(
        (status = 200, description = "All items", body = ItemsEnvelope),
        (status = 500, description = "Internal server error", body = FailureEnvelope),
        (status = 503, description = "Item store unavailable", body = FailureEnvelope)
    ),
    tags = ["items"],
    operation_id = "listItems"
)]
pub async fn list_items(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let items = state.items_query.list_all().await?;
    Ok(HttpResponse::Ok().json(ItemsEnvelope::ok(items)))
}

/// List the items of one owner.
#[utoipa::path(
    get,
    path = "/items/{ownerId}",
    description = "An owner without items yields an empty list.",
    params(("ownerId" = String, Path, description = "Owning user")),
    responses(
        (status = 200, description = "Items of the owner", body = ItemsEnvelope),
        (status = 400, description = "Missed Parameter", body = FailureEnvelope),
        (status = 500, description = "Internal server error", body = FailureEnvelope),
        (status = 503, description = "Item store unavailable", body = FailureEnvelope)
    ),
    tags = ["items"],
    operation_id = "listItemsByOwner"
)]
pub async fn list_items_by_owner(
    state: web::Data<HttpState>,
    request: HttpRequest,
) -> ApiResult<HttpResponse> {
    let raw = single_param(&request, OWNER_ID)?;
    let owner = OwnerId::new(raw.as_str())
        .map_err(|err| parameter_error(Arity::Single, OWNER_ID, &raw, &err))?;
    let items = state.items_query.list_by_owner(&owner).await?;
    Ok(HttpResponse::Ok().json(ItemsEnvelope::ok(items)))
}

/// Fallback for unmatched paths and unsupported methods on matched ones.
pub async fn route_not_found() -> ApiResult<HttpResponse> {
    Err(unmatched_route_error())
}

/// Register the item routes.
///
/// Order matters: `/items/all` must be registered before the owner listing
/// so that `all` is never read as an owner id.
pub fn configure(cfg: &mut web::ServiceConfig) {
    let tail = |prefix: &str| format!("{prefix}/{{{PARAMS}:.*}}");

    cfg.service(
        web::resource(["/items/insert".to_owned(), tail("/items/insert")])
            .route(web::get().to(insert_item))
            .route(web::post().to(insert_item))
            .default_service(web::to(route_not_found)),
    )
    .service(
        web::resource(["/items/delete".to_owned(), tail("/items/delete")])
            .route(web::get().to(delete_item))
            .route(web::delete().to(delete_item))
            .default_service(web::to(route_not_found)),
    )
    .service(
        web::resource(["/items/all", "/items/all/"])
            .route(web::get().to(list_items))
            .default_service(web::to(route_not_found)),
    )
    .service(
        web::resource(["/items".to_owned(), tail("/items")])
            .route(web::get().to(list_items_by_owner))
            .default_service(web::to(route_not_found)),
    );
}

#[cfg(test)]
#[path = "items_tests.rs"]
mod tests;
