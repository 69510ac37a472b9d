use contracts::domain::a001_product::dto::ProductDto;
use contracts::shared::filter_form::FilterMap;
use once_cell::sync::Lazy;

/// Демо-каталог товаров, хранится в памяти
static CATALOG: Lazy<Vec<ProductDto>> = Lazy::new(|| {
    [
        (1, "The Hobbit", "books", "active", 1_290_00),
        (2, "The Silmarillion", "books", "archived", 1_590_00),
        (3, "Kind of Blue", "music", "active", 2_490_00),
        (4, "A Love Supreme", "music", "active", 2_190_00),
        (5, "Dune", "books", "active", 990_00),
        (6, "Programming Rust", "books", "active", 4_590_00),
        (7, "Blue Train", "music", "archived", 1_890_00),
        (8, "Go Board", "games", "active", 5_990_00),
        (9, "Chess Set", "games", "active", 3_490_00),
        (10, "The Rust Programming Language", "books", "active", 3_990_00),
        (11, "Catan", "games", "archived", 4_290_00),
        (12, "Giant Steps", "music", "active", 1_990_00),
    ]
    .into_iter()
    .map(|(id, name, category, status, price)| ProductDto {
        id,
        name: name.to_string(),
        category: category.to_string(),
        status: status.to_string(),
        price,
    })
    .collect()
});

pub const CATEGORIES: &[(&str, &str)] = &[
    ("", "Все категории"),
    ("books", "Книги"),
    ("music", "Музыка"),
    ("games", "Игры"),
];

pub const STATUSES: &[(&str, &str)] = &[
    ("", "Любой статус"),
    ("active", "В продаже"),
    ("archived", "Архив"),
];

/// Проверяет, подходит ли товар под фильтр (пустые значения не ограничивают выборку)
fn matches(product: &ProductDto, filter: &FilterMap) -> bool {
    let active = |key: &str| filter.get(key).filter(|value| !value.is_empty());

    if let Some(q) = active("q") {
        if !product.name.to_lowercase().contains(&q.to_lowercase()) {
            return false;
        }
    }
    if let Some(category) = active("category") {
        if product.category != category {
            return false;
        }
    }
    if let Some(status) = active("status") {
        if product.status != status {
            return false;
        }
    }
    true
}

/// Возвращает страницу товаров (нумерация с 1) и общее количество подходящих записей
pub fn list_with_filters(filter: &FilterMap, page: usize, page_size: usize) -> (Vec<ProductDto>, usize) {
    let matched: Vec<&ProductDto> = CATALOG
        .iter()
        .filter(|product| matches(product, filter))
        .collect();
    let total = matched.len();

    let page_size = page_size.max(1);
    let offset = page.saturating_sub(1).saturating_mul(page_size);
    let items = matched
        .into_iter()
        .skip(offset)
        .take(page_size)
        .cloned()
        .collect();

    (items, total)
}
