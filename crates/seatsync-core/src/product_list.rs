use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Fixed list of product ids to snapshot instead of discovering event
/// products from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductList {
    pub products: Vec<i64>,
}

/// Load and validate the product list from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_product_list(path: &Path) -> Result<ProductList, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ProductListIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let list: ProductList = serde_yaml::from_str(&content)?;
    validate_product_list(&list)?;
    Ok(list)
}

fn validate_product_list(list: &ProductList) -> Result<(), ConfigError> {
    if list.products.is_empty() {
        return Err(ConfigError::Validation(
            "product list must contain at least one product id".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for id in &list.products {
        if *id <= 0 {
            return Err(ConfigError::Validation(format!(
                "invalid product id {id}; ids must be positive"
            )));
        }
        if !seen.insert(*id) {
            return Err(ConfigError::Validation(format!(
                "duplicate product id: {id}"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_yaml_list() {
        let list: ProductList = serde_yaml::from_str("products:\n  - 3986\n  - 4060\n").unwrap();
        assert_eq!(list.products, vec![3986, 4060]);
        assert!(validate_product_list(&list).is_ok());
    }

    #[test]
    fn rejects_empty_list() {
        let list = ProductList { products: vec![] };
        let err = validate_product_list(&list).unwrap_err();
        assert!(err.to_string().contains("at least one"));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let list = ProductList {
            products: vec![4060, 4061, 4060],
        };
        let err = validate_product_list(&list).unwrap_err();
        assert!(err.to_string().contains("duplicate product id: 4060"));
    }

    #[test]
    fn rejects_non_positive_ids() {
        let list = ProductList { products: vec![0] };
        assert!(validate_product_list(&list).is_err());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_product_list(Path::new("/nonexistent/products.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::ProductListIo { .. }));
    }
}
