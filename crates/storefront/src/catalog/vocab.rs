//! Canonical catalog vocabularies.
//!
//! Served to clients for form population (admin product editor, filter
//! sidebar). The filter engine itself accepts values loosely; these lists
//! are conventions, not constraints.

/// Product sizes: letter, numeric waist, dress, and special sizes.
pub const PRODUCT_SIZES: &[&str] = &[
    // Letter sizes
    "XS", "S", "M", "L", "XL", "XXL", "XXXL",
    // Numeric sizes (waist/inseam)
    "28", "29", "30", "31", "32", "33", "34", "35", "36", "37", "38", "39", "40", "41", "42",
    "43", "44", "45", "46",
    // Dress sizes
    "2", "4", "6", "8", "10", "12", "14", "16", "18", "20", "22", "24",
    // Special sizes
    "One Size", "Free Size",
];

/// Product colors: basic, fashion, metallic, pattern, and finish names.
pub const PRODUCT_COLORS: &[&str] = &[
    // Basic colors
    "Black", "White", "Gray", "Navy", "Brown", "Beige", "Khaki",
    // Primary colors
    "Red", "Blue", "Green", "Yellow", "Orange", "Purple", "Pink",
    // Fashion colors
    "Maroon", "Burgundy", "Olive", "Teal", "Turquoise", "Coral",
    // Metallic colors
    "Gold", "Silver", "Rose Gold", "Copper", "Bronze",
    // Fabric patterns
    "Denim", "Chambray", "Striped", "Polka Dot", "Floral", "Plaid",
    // Special finishes
    "Multicolor", "Neon", "Pastel", "Vintage", "Metallic",
];

/// Product categories used in creation and filtering.
pub const PRODUCT_CATEGORIES: &[&str] = &[
    "T-Shirts",
    "Jeans",
    "Dresses",
    "Shirts",
    "Pants",
    "Shorts",
    "Skirts",
    "Jackets",
    "Coats",
    "Sweaters",
    "Hoodies",
    "Sweatshirts",
    "Tank Tops",
    "Blouses",
    "Suits",
    "Activewear",
    "Swimwear",
    "Underwear",
    "Socks",
    "Accessories",
    "Shoes",
    "Bags",
    "Jewelry",
    "Other",
];
