//! Tutorial endpoints
//!
//! Each handler is a pure function of its bound parameters and the static
//! fixtures. `routes()` registers them in the order they are served.

use serde_json::{json, Map, Value};

use super::fixtures::{find_cart_item, IdName, FAKE_NAMES, LIST_ITEMS};
use crate::params::{ParamSpec, ParamType, ParamValue, Params, PathEnum};
use crate::routing::{HandlerResult, RouteDef, RouteError, RouteTable};
use crate::schema::{FieldType, RecordSchema};

/// Build the route table for every tutorial endpoint
pub fn routes() -> Result<RouteTable, RouteError> {
    let mut table = RouteTable::new();

    table.add(RouteDef::get("/", read_root).named("read_root"))?;
    table.add(
        RouteDef::get("/items/{it}", read_item)
            .named("read_item")
            .param(ParamSpec::path("it", ParamType::Int)),
    )?;
    table.add(RouteDef::get("/users/me", read_current_user).named("read_current_user"))?;
    table.add(
        RouteDef::get("/users/{user_id}", read_user)
            .named("read_user")
            .param(ParamSpec::path("user_id", ParamType::Int)),
    )?;
    table.add(
        RouteDef::get("/names/{name_id}", read_name)
            .named("read_name")
            .param(ParamSpec::path("name_id", ParamType::Enum(IdName::LABELS))),
    )?;
    table.add(
        RouteDef::get("/files/{file_path:path}", read_file)
            .named("read_file")
            .param(ParamSpec::path("file_path", ParamType::Str)),
    )?;
    table.add(
        RouteDef::get("/fake_names/", read_fake_names)
            .named("read_fake_names")
            .param(skip())
            .param(limit()),
    )?;
    table.add(
        RouteDef::get("/fake_names_optional/", read_fake_names_optional)
            .named("read_fake_names_optional")
            .param(skip())
            .param(limit())
            .param(ParamSpec::query("name", ParamType::Str).optional()),
    )?;
    table.add(
        RouteDef::get("/items_bought/{name_id}/items/{item_id}", cart_items)
            .named("cart_items")
            .param(ParamSpec::path("name_id", ParamType::Enum(IdName::LABELS)))
            .param(ParamSpec::path("item_id", ParamType::Int))
            .param(ParamSpec::query("qty", ParamType::Int).default(ParamValue::Int(1)))
            .param(ParamSpec::query("price", ParamType::Float).optional()),
    )?;
    table.add(
        RouteDef::post("/items/", create_item)
            .named("create_item")
            .body(item_schema()),
    )?;
    table.add(
        RouteDef::post("/items/{item_id}", create_item_with_path)
            .named("create_item_with_path")
            .param(ParamSpec::path("item_id", ParamType::Int))
            .body(item_schema()),
    )?;
    table.add(
        RouteDef::get("/items_with_validation/", read_items_with_validation)
            .named("read_items_with_validation")
            .param(ParamSpec::query("item_id", ParamType::Int))
            .param(ParamSpec::query("q", ParamType::Str).optional().max_length(50))
            .param(skip())
            .param(limit()),
    )?;
    // `q` carries no length limit here
    table.add(
        RouteDef::get(
            "/items_with_validation_non_annotated/",
            read_items_with_validation,
        )
        .named("read_items_with_validation_non_annotated")
        .param(ParamSpec::query("item_id", ParamType::Int))
        .param(ParamSpec::query("q", ParamType::Str).optional())
        .param(skip())
        .param(limit()),
    )?;
    table.add(
        RouteDef::get("/items_with_list/", read_items_with_list)
            .named("read_items_with_list")
            .param(ParamSpec::query("q", ParamType::StrList).optional()),
    )?;
    table.add(
        RouteDef::get("/items_with_deprecated/", read_items_with_deprecated)
            .named("read_items_with_deprecated")
            .param(ParamSpec::query("item_id", ParamType::Int))
            .param(
                ParamSpec::query("q", ParamType::Str)
                    .default(ParamValue::Str("Its a product".to_string())),
            )
            .param(
                ParamSpec::query("qty", ParamType::Int)
                    .default(ParamValue::Int(1))
                    .deprecated(),
            )
            .param(
                ParamSpec::query("stock", ParamType::Int)
                    .default(ParamValue::Int(1000))
                    .deprecated()
                    .hidden(),
            ),
    )?;

    Ok(table)
}

fn skip() -> ParamSpec {
    ParamSpec::query("skip", ParamType::Int).default(ParamValue::Int(0))
}

fn limit() -> ParamSpec {
    ParamSpec::query("limit", ParamType::Int).default(ParamValue::Int(10))
}

/// Request body for the item endpoints
fn item_schema() -> RecordSchema {
    RecordSchema::new("Item")
        .required("id", FieldType::Int)
        .required("name", FieldType::Str)
        .required("price", FieldType::Float)
        .with_default("quantity", FieldType::Int, json!(1))
        .optional("discount", FieldType::Float)
}

fn read_root(_: &Params) -> HandlerResult {
    Ok(json!({ "message": "Hello World" }))
}

fn read_item(params: &Params) -> HandlerResult {
    Ok(json!({ "item_id": params.int("it")? }))
}

fn read_current_user(_: &Params) -> HandlerResult {
    Ok(json!({ "User": "Praneeth" }))
}

fn read_user(params: &Params) -> HandlerResult {
    Ok(json!({ "user_id": params.int("user_id")? }))
}

fn read_name(params: &Params) -> HandlerResult {
    let name: IdName = params.enumerated("name_id")?;
    Ok(match name {
        IdName::Venu => json!({
            "name": name.label(),
            "detail": "Father",
            "note": "Using value directly for comparison",
        }),
        IdName::Praneeth | IdName::Rohit | IdName::Jyothi => json!({ "name": name.label() }),
    })
}

fn read_file(params: &Params) -> HandlerResult {
    Ok(json!({ "file_path": params.text("file_path")? }))
}

fn read_fake_names(params: &Params) -> HandlerResult {
    let page = window(&FAKE_NAMES, params.int("skip")?, params.int("limit")?);
    Ok(name_records(page))
}

fn read_fake_names_optional(params: &Params) -> HandlerResult {
    let matching: Vec<&str> = match params.text_opt("name").filter(|n| !n.is_empty()) {
        Some(wanted) => FAKE_NAMES.iter().copied().filter(|n| *n == wanted).collect(),
        None => FAKE_NAMES.to_vec(),
    };
    let page = window(&matching, params.int("skip")?, params.int("limit")?);
    Ok(name_records(page))
}

fn cart_items(params: &Params) -> HandlerResult {
    let buyer: IdName = params.enumerated("name_id")?;
    let item_id = params.int("item_id")?;

    // A lookup miss is a normal 200 payload, not a dispatch error
    let Some(item) = find_cart_item(item_id) else {
        return Ok(json!({ "error": "Item not found" }));
    };

    let mut response = Map::new();
    response.insert("buyer".into(), buyer.label().into());
    response.insert("item_id".into(), item_id.into());
    response.insert("item".into(), item.name.into());
    response.insert("qty".into(), params.int("qty")?.into());
    // zero counts as "no price"
    if let Some(price) = params.float_opt("price").filter(|p| *p != 0.0) {
        response.insert("price".into(), price.into());
    }
    Ok(Value::Object(response))
}

fn create_item(params: &Params) -> HandlerResult {
    Ok(Value::Object(params.body()?.clone()))
}

fn create_item_with_path(params: &Params) -> HandlerResult {
    Ok(json!({
        "item_id": params.int("item_id")?,
        "item": params.body()?,
    }))
}

fn read_items_with_validation(params: &Params) -> HandlerResult {
    let mut response = Map::new();
    response.insert("item_id".into(), params.int("item_id")?.into());
    if let Some(q) = params.text_opt("q").filter(|q| !q.is_empty()) {
        response.insert("q".into(), q.into());
    }
    response.insert("skip".into(), params.int("skip")?.into());
    response.insert("limit".into(), params.int("limit")?.into());
    Ok(Value::Object(response))
}

fn read_items_with_list(params: &Params) -> HandlerResult {
    let wanted = params.list_opt("q").filter(|q| !q.is_empty());
    let selected: Map<String, Value> = LIST_ITEMS
        .iter()
        .filter(|item| wanted.map_or(true, |q| q.iter().any(|w| w == *item)))
        .map(|item| ((*item).to_string(), Value::from(*item)))
        .collect();
    Ok(Value::Object(selected))
}

fn read_items_with_deprecated(params: &Params) -> HandlerResult {
    Ok(json!({
        "item_id": params.int("item_id")?,
        "q": params.text("q")?,
        "qty": params.int("qty")?,
        "message": "qty is deprecated, use quantity instead",
    }))
}

fn name_records(names: &[&str]) -> Value {
    names.iter().map(|name| json!({ "name": name })).collect()
}

/// `items[skip : skip + limit]` with Python slice semantics: negative
/// bounds count from the end, out-of-range bounds are clamped.
fn window<'a, T>(items: &'a [T], skip: i64, limit: i64) -> &'a [T] {
    let len = i64::try_from(items.len()).unwrap_or(i64::MAX);
    let resolve = |index: i64| -> usize {
        let bounded = if index < 0 {
            (index.saturating_add(len)).max(0)
        } else {
            index.min(len)
        };
        usize::try_from(bounded).unwrap_or(0)
    };

    let start = resolve(skip);
    let stop = resolve(skip.saturating_add(limit));
    if start >= stop {
        &[]
    } else {
        &items[start..stop]
    }
}
