use super::{Catalog, CatalogRecord};

/// Coin reseller agent accounts. `active` is 1/0 rather than a boolean so
/// the column compares cleanly in SQL.
pub fn catalog() -> Catalog {
    Catalog::new(
        "agents",
        vec![
            CatalogRecord::new("agent-amman-1")
                .attr("name", "Amman Coins Center")
                .attr("region", "amman")
                .attr("active", 1),
            CatalogRecord::new("agent-cairo-1")
                .attr("name", "Cairo Top-Up Store")
                .attr("region", "cairo")
                .attr("active", 1),
            CatalogRecord::new("agent-riyadh-1")
                .attr("name", "Riyadh Gaming Shop")
                .attr("region", "riyadh")
                .attr("active", 1),
            CatalogRecord::new("agent-dubai-1")
                .attr("name", "Dubai Recharge Point")
                .attr("region", "dubai")
                .attr("active", 0),
        ],
    )
}
