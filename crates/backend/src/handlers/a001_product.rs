use std::collections::HashMap;

use ammonia::clean_text;
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use contracts::domain::a001_product::dto::{ProductDto, ProductListResponse};
use contracts::shared::filter_form::{
    Direction, FilterAction, FilterActionResponse, FilterMap, FilterStateResponse,
};

use crate::domain::a001_product::repository;
use crate::routes::AppState;
use crate::shared::config::{get_template_path, Config, FilterFormConfig};
use crate::shared::filter_form::{
    FileTemplate, FilterFormControl, FilterFormError, HtmlForm, HttpRequestContext, QueryState,
    RequestContext,
};

const LIST_PATH: &str = "/products";
const PAGE_PARAM: &str = "page";

/// Фильтр списка товаров: поля формы, настройки из config.toml и слушатели событий
pub fn build_filter_control(config: &FilterFormConfig) -> FilterFormControl<HtmlForm> {
    let mut form = HtmlForm::new(LIST_PATH);
    form.add_text("q", "Поиск")
        .add_select("category", "Категория", repository::CATEGORIES)
        .add_select("status", "Статус", repository::STATUSES);

    let mut control = FilterFormControl::new(config.name.clone(), form);
    control
        .set_ajax_request(config.ajax)
        .set_default_values(config.default_values())
        .set_data_filter(collapse_search_whitespace)
        .on_filter(|control, data| {
            tracing::info!(control = control.name(), ?data, "Product filter applied");
            Ok(())
        })
        .on_reset(|control, _| {
            tracing::info!(control = control.name(), "Product filter cleared");
            Ok(())
        });

    if let Some(template) = get_template_path(config) {
        control.set_template_file(template);
    }
    control
}

/// Схлопывает повторяющиеся пробелы в строке поиска перед сохранением
fn collapse_search_whitespace(filter: &FilterMap, direction: Direction) -> Option<FilterMap> {
    if direction != Direction::Outbound {
        return None;
    }
    let q = filter.get("q")?;
    let collapsed = q.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed == q {
        return None;
    }

    let mut filter = filter.clone();
    if collapsed.is_empty() {
        filter.remove("q");
    } else {
        filter.set("q", collapsed);
    }
    Some(filter)
}

fn current_page(query: &QueryState) -> usize {
    query
        .param(PAGE_PARAM)
        .and_then(|page| page.parse::<usize>().ok())
        .unwrap_or(1)
        .max(1)
}

/// GET /products
pub async fn list_page(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Html<String>, StatusCode> {
    let query = QueryState::from_params(params);
    let mut control = build_filter_control(&state.config.filter_form);
    control.load_state(&query);

    render_page(&state.config, &mut control, &query, &[]).map(Html)
}

/// POST /products - кнопки "Filter" и "Reset" формы фильтра
pub async fn submit(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Form(body): Form<Vec<(String, String)>>,
) -> Response {
    let mut query = QueryState::from_params(params);
    let mut control = build_filter_control(&state.config.filter_form);
    control.load_state(&query);

    let Some(action) = control.form_mut().load_submission(&body) else {
        tracing::warn!("Filter submission without a known submit button");
        return StatusCode::BAD_REQUEST.into_response();
    };

    let mut request = HttpRequestContext::from_headers(&headers);
    let data = match control.dispatch(action, &mut request) {
        Ok(data) => data,
        Err(FilterFormError::Validation(errors)) => {
            tracing::warn!("Filter form rejected: {}", errors.join("; "));
            if request.is_ajax() {
                return (StatusCode::UNPROCESSABLE_ENTITY, Json(errors)).into_response();
            }
            return match render_page(&state.config, &mut control, &query, &errors) {
                Ok(html) => (StatusCode::UNPROCESSABLE_ENTITY, Html(html)).into_response(),
                Err(status) => status.into_response(),
            };
        }
        Err(e) => {
            tracing::error!("Filter action {:?} failed: {}", action, e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    // новый фильтр всегда начинается с первой страницы
    control.save_state(&mut query);
    query.remove_param(PAGE_PARAM);

    if request.redirect_requested() {
        return Redirect::to(&query.link(LIST_PATH)).into_response();
    }

    control.form_mut().set_action(query.link(LIST_PATH));
    let html = match control.render(&mut FileTemplate::new()) {
        Ok(html) => html,
        Err(e) => {
            tracing::error!("Failed to render filter form: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    Json(FilterActionResponse {
        action,
        token: control.token().map(str::to_owned),
        data,
        query: query.to_query_string(),
        html,
    })
    .into_response()
}

/// GET /api/a001/products
pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<ProductListResponse> {
    let query = QueryState::from_params(params);
    let mut control = build_filter_control(&state.config.filter_form);
    control.load_state(&query);

    let filter = control.get_data();
    let page = current_page(&query);
    let page_size = state.config.listing.page_size.max(1);
    let (items, total_count) = repository::list_with_filters(&filter, page, page_size);
    let has_more = total_count > page.saturating_mul(page_size);

    Json(ProductListResponse {
        items,
        total_count,
        page,
        has_more,
        filter,
    })
}

/// GET /api/a001/products/filter
pub async fn filter_state(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<FilterStateResponse> {
    let query = QueryState::from_params(params);
    let mut control = build_filter_control(&state.config.filter_form);
    control.load_state(&query);

    Json(FilterStateResponse {
        token: control.token().map(str::to_owned),
        data: control.get_data(),
    })
}

fn render_page(
    config: &Config,
    control: &mut FilterFormControl<HtmlForm>,
    query: &QueryState,
    errors: &[String],
) -> Result<String, StatusCode> {
    let filter = control.get_data();
    let page = current_page(query);
    let page_size = config.listing.page_size.max(1);
    let (items, total) = repository::list_with_filters(&filter, page, page_size);

    control.form_mut().set_action(query.link(LIST_PATH));
    let form = control.render(&mut FileTemplate::new()).map_err(|e| {
        tracing::error!("Failed to render filter form: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let errors = if errors.is_empty() {
        String::new()
    } else {
        let list = errors
            .iter()
            .map(|error| format!("<li>{}</li>", clean_text(error)))
            .collect::<String>();
        format!(r#"<ul class="filter-errors">{}</ul>"#, list)
    };

    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Товары</title>
<link rel="stylesheet" href="/static/app.css">
<script src="/static/filter-form.js" defer></script>
</head>
<body>
<h1>Товары</h1>
{errors}
{form}
<div id="product-list">
<p class="total">Найдено: {total}</p>
<table>
<thead><tr><th>#</th><th>Название</th><th>Категория</th><th>Статус</th><th>Цена</th></tr></thead>
<tbody>{rows}</tbody>
</table>
{pagination}
</div>
</body>
</html>
"#,
        errors = errors,
        form = form,
        total = total,
        rows = render_rows(&items),
        pagination = render_pagination(query, page, page_size, total),
    ))
}

fn render_rows(items: &[ProductDto]) -> String {
    items
        .iter()
        .map(|product| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}.{:02}</td></tr>",
                product.id,
                clean_text(&product.name),
                clean_text(&product.category),
                clean_text(&product.status),
                product.price / 100,
                product.price % 100
            )
        })
        .collect()
}

/// Ссылки на страницы сохраняют все persistent-параметры, в том числе токен фильтра
fn render_pagination(query: &QueryState, page: usize, page_size: usize, total: usize) -> String {
    let pages = total.div_ceil(page_size);
    if pages <= 1 {
        return String::new();
    }

    let links = (1..=pages)
        .map(|number| {
            if number == page {
                format!("<span class=\"current\">{}</span>", number)
            } else {
                let mut target = query.clone();
                target.set_param(PAGE_PARAM, number.to_string());
                format!(
                    "<a href=\"{}\">{}</a>",
                    clean_text(&target.link(LIST_PATH)),
                    number
                )
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    format!("<nav class=\"pagination\">{}</nav>", links)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::*;
    use crate::routes::configure_routes;
    use crate::shared::config::{ListingConfig, ServerConfig};

    fn test_config() -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            listing: ListingConfig { page_size: 5 },
            filter_form: FilterFormConfig {
                default_values: BTreeMap::from([("status".to_string(), "active".to_string())]),
                ..FilterFormConfig::default()
            },
        }
    }

    fn app() -> axum::Router {
        configure_routes(AppState {
            config: Arc::new(test_config()),
        })
    }

    fn post(uri: &str, body: &str, ajax: bool) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if ajax {
            builder = builder.header("X-Requested-With", "XMLHttpRequest");
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn token_from_location(location: &str) -> Option<String> {
        let query = location.split_once('?')?.1;
        let params: HashMap<String, String> = serde_qs::from_str(query).ok()?;
        params.get("filter-data").cloned()
    }

    #[test]
    fn test_collapse_search_whitespace() {
        let filter = FilterMap::from_values([("q", "  the   hobbit ")]);
        let collapsed = collapse_search_whitespace(&filter, Direction::Outbound).unwrap();
        assert_eq!(collapsed.get("q"), Some("the hobbit"));

        assert!(collapse_search_whitespace(&filter, Direction::Inbound).is_none());
        assert!(collapse_search_whitespace(&collapsed, Direction::Outbound).is_none());
    }

    #[tokio::test]
    async fn test_list_page_renders_form() {
        let response = app()
            .oneshot(Request::builder().uri("/products").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("filterFormControl"));
        assert!(html.contains(r#"name="filter""#));
        // статус по умолчанию - "active"
        assert!(html.contains(r#"<option value="active" selected>"#));
    }

    #[tokio::test]
    async fn test_submit_redirects_with_token() {
        let response = app()
            .oneshot(post(
                "/products?page=3",
                "q=&category=books&status=&filter=1",
                false,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response.headers()[header::LOCATION].to_str().unwrap();
        assert!(location.starts_with("/products?"));
        assert!(!location.contains("page="));
        assert_eq!(
            token_from_location(location).as_deref(),
            Some("category=books&status=active")
        );
    }

    #[tokio::test]
    async fn test_filtered_page_survives_pagination() {
        let token = urlencoding::encode("category=books&status=active");
        let response = app()
            .oneshot(
                Request::builder()
                    .uri(format!("/products?filter-data={}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let html = body_text(response).await;
        assert!(html.contains(r#"<option value="books" selected>"#));
        assert!(html.contains("Найдено: 4"));
        assert!(!html.contains("Kind"));
    }

    #[tokio::test]
    async fn test_ajax_submit_returns_json() {
        let response = app()
            .oneshot(post("/products", "q=dune&category=&status=&filter=1", true))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let payload: FilterActionResponse = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(payload.action, FilterAction::Filter);
        assert_eq!(payload.token.as_deref(), Some("q=dune&status=active"));
        assert_eq!(payload.data.get("q"), Some("dune"));
        assert_eq!(payload.data.get("category"), None);
        assert!(payload.html.contains(r#"value="dune""#));
    }

    #[tokio::test]
    async fn test_reset_clears_token() {
        let response = app()
            .oneshot(post(
                "/products?filter-data=category%3Dbooks",
                "q=&category=books&status=&reset=1",
                false,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/products");
    }

    #[tokio::test]
    async fn test_invalid_option_is_rejected() {
        let response = app()
            .oneshot(post("/products", "q=&category=cars&status=&filter=1", false))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_text(response).await.contains("filter-errors"));
    }

    #[tokio::test]
    async fn test_submission_without_button_is_bad_request() {
        let response = app()
            .oneshot(post("/products", "q=dune", false))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_api_lists_filtered_products() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/a001/products?filter-data=category%3Dmusic")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let payload: ProductListResponse = serde_json::from_str(&body_text(response).await).unwrap();
        // статус по умолчанию ограничивает выборку товарами в продаже
        assert_eq!(payload.total_count, 3);
        assert!(!payload.has_more);
        assert_eq!(payload.filter.get("status"), Some("active"));
        assert!(payload.items.iter().all(|p| p.category == "music"));
    }

    #[tokio::test]
    async fn test_ajax_reset_returns_cleared_state() {
        let response = app()
            .oneshot(post(
                "/products?filter-data=category%3Dbooks&page=2",
                "q=&category=books&status=&reset=1",
                true,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let payload: FilterActionResponse = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(payload.action, FilterAction::Reset);
        assert_eq!(payload.token, None);
        assert!(!payload.query.contains("filter-data"));
        assert!(!payload.query.contains("page="));
        assert_eq!(payload.data.get("category"), None);
    }

    #[tokio::test]
    async fn test_huge_page_number_is_served() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/a001/products?page=18446744073709551615")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let payload: ProductListResponse = serde_json::from_str(&body_text(response).await).unwrap();
        assert!(payload.items.is_empty());
        assert!(!payload.has_more);
        assert_eq!(payload.total_count, 9);

        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/products?page=18446744073709551615")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_placeholder_in_filter_value_is_not_expanded() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/products?filter-data=q%3D%257B%257Bform%257D%257D")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let html = body_text(response).await;
        assert_eq!(html.matches("<form").count(), 1);
        assert!(html.contains("{{form}}"));
    }

    #[tokio::test]
    async fn test_pagination_links_are_escaped() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/products?filter-data=status%3Dactive")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let html = body_text(response).await;
        assert!(html.contains("pagination"));
        assert!(html.contains("&amp;page"));
        assert!(!html.contains("&page="));
    }
}
