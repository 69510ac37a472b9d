use serde::{Deserialize, Serialize};

use crate::shared::filter_form::FilterMap;

/// DTO товара демо-каталога (a001)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductDto {
    pub id: u32,
    pub name: String,
    pub category: String,
    pub status: String,
    /// Цена в копейках
    pub price: i64,
}

/// Ответ на запрос списка товаров с учетом сохраненного фильтра
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductListResponse {
    pub items: Vec<ProductDto>,
    pub total_count: usize,
    pub page: usize,
    pub has_more: bool,
    /// Фильтр в том виде, в котором он отображается в форме
    pub filter: FilterMap,
}
