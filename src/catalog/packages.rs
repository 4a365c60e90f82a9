use super::{Catalog, CatalogRecord};
use serde_json::json;

/// Gem bundles and subscription packages. Feature lists are stored as
/// JSON arrays in the `features` column.
pub fn catalog() -> Catalog {
    Catalog::new(
        "packages",
        vec![
            CatalogRecord::new("gems-100")
                .attr("name", "Starter Gems")
                .attr("gems", 100)
                .attr("price_usd", 0.99)
                .attr("features", json!([]))
                .attr("bonus_gems", 0),
            CatalogRecord::new("gems-550")
                .attr("name", "Value Gems")
                .attr("gems", 550)
                .attr("price_usd", 4.99)
                .attr("features", json!([]))
                .attr("bonus_gems", 50),
            CatalogRecord::new("gems-1200")
                .attr("name", "Big Gems")
                .attr("gems", 1200)
                .attr("price_usd", 9.99)
                .attr("features", json!([]))
                .attr("bonus_gems", 200),
            CatalogRecord::new("vip-monthly")
                .attr("name", "VIP Monthly")
                .attr("gems", 0)
                .attr("price_usd", 9.99)
                .attr("features", json!(["no_ads", "vip_badge", "room_priority"]))
                .attr("bonus_gems", 100),
            CatalogRecord::new("vip-yearly")
                .attr("name", "VIP Yearly")
                .attr("gems", 0)
                .attr("price_usd", 89.99)
                .attr(
                    "features",
                    json!(["no_ads", "vip_badge", "room_priority", "yearly_frame"]),
                )
                .attr("bonus_gems", 1500),
        ],
    )
}
