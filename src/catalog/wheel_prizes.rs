use super::{Catalog, CatalogRecord};

/// Prize wheel segments. Weights are relative draw odds; they do not need
/// to sum to anything in particular.
pub fn catalog() -> Catalog {
    Catalog::new(
        "wheel_prizes",
        vec![
            CatalogRecord::new("coins-10")
                .attr("label", "10 Coins")
                .attr("coins", 10)
                .attr("weight", 35)
                .attr("color", "#ffd166"),
            CatalogRecord::new("coins-25")
                .attr("label", "25 Coins")
                .attr("coins", 25)
                .attr("weight", 25)
                .attr("color", "#06d6a0"),
            CatalogRecord::new("coins-50")
                .attr("label", "50 Coins")
                .attr("coins", 50)
                .attr("weight", 18)
                .attr("color", "#118ab2"),
            CatalogRecord::new("coins-100")
                .attr("label", "100 Coins")
                .attr("coins", 100)
                .attr("weight", 12)
                .attr("color", "#ef476f"),
            CatalogRecord::new("coins-250")
                .attr("label", "250 Coins")
                .attr("coins", 250)
                .attr("weight", 6)
                .attr("color", "#8338ec"),
            CatalogRecord::new("coins-500")
                .attr("label", "500 Coins")
                .attr("coins", 500)
                .attr("weight", 3)
                .attr("color", "#fb5607"),
            CatalogRecord::new("jackpot")
                .attr("label", "Jackpot 2000")
                .attr("coins", 2000)
                .attr("weight", 1)
                .attr("color", "#ffbe0b"),
        ],
    )
}
