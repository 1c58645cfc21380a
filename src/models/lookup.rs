//! Lookup tables referenced by recipes

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// How long a recipe takes to cook
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CookingDuration {
    pub id: i32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

/// How hard a recipe is
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Difficulty {
    pub id: i32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_name_is_omitted() {
        let json = serde_json::to_string(&Difficulty { id: 2, name: String::new() }).unwrap();
        assert_eq!(json, r#"{"id":2}"#);

        let json = serde_json::to_string(&CookingDuration { id: 3, name: "Long (60+ min)".into() }).unwrap();
        assert!(json.contains(r#""name":"Long (60+ min)""#));
    }
}
