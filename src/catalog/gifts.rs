use super::{Catalog, CatalogRecord};

/// The gift shop catalog: display name, Arabic name, coin price, icon
/// asset and rarity tier per gift.
pub fn catalog() -> Catalog {
    Catalog::new(
        "gifts",
        vec![
            CatalogRecord::new("rose-1")
                .attr("name", "Rose")
                .attr("name_ar", "وردة")
                .attr("price", 1)
                .attr("icon", "gifts/rose.png")
                .attr("rarity", "common"),
            CatalogRecord::new("heart-1")
                .attr("name", "Heart")
                .attr("name_ar", "قلب")
                .attr("price", 2)
                .attr("icon", "gifts/heart.png")
                .attr("rarity", "common"),
            CatalogRecord::new("chocolate-1")
                .attr("name", "Chocolate Box")
                .attr("name_ar", "علبة شوكولاتة")
                .attr("price", 5)
                .attr("icon", "gifts/chocolate.png")
                .attr("rarity", "common"),
            CatalogRecord::new("perfume-1")
                .attr("name", "Perfume")
                .attr("name_ar", "عطر")
                .attr("price", 10)
                .attr("icon", "gifts/perfume.png")
                .attr("rarity", "rare"),
            CatalogRecord::new("teddy-1")
                .attr("name", "Teddy Bear")
                .attr("name_ar", "دبدوب")
                .attr("price", 25)
                .attr("icon", "gifts/teddy.png")
                .attr("rarity", "rare"),
            CatalogRecord::new("ring-1")
                .attr("name", "Diamond Ring")
                .attr("name_ar", "خاتم ألماس")
                .attr("price", 50)
                .attr("icon", "gifts/ring.png")
                .attr("rarity", "epic"),
            CatalogRecord::new("crown-1")
                .attr("name", "Golden Crown")
                .attr("name_ar", "تاج ذهبي")
                .attr("price", 100)
                .attr("icon", "gifts/crown.png")
                .attr("rarity", "epic"),
            CatalogRecord::new("car-1")
                .attr("name", "Sports Car")
                .attr("name_ar", "سيارة رياضية")
                .attr("price", 500)
                .attr("icon", "gifts/car.png")
                .attr("rarity", "legendary"),
            CatalogRecord::new("yacht-1")
                .attr("name", "Yacht")
                .attr("name_ar", "يخت")
                .attr("price", 1000)
                .attr("icon", "gifts/yacht.png")
                .attr("rarity", "legendary"),
            CatalogRecord::new("castle-1")
                .attr("name", "Castle")
                .attr("name_ar", "قلعة")
                .attr("price", 5000)
                .attr("icon", "gifts/castle.png")
                .attr("rarity", "legendary"),
        ],
    )
}
