mod cart_pricing;

pub use cart_pricing::{
    parse_cart_metadata,
    price_cart,
    CartItemRequest,
    CartValidationError,
    PriceIssue,
    PricedCart,
    PricingPolicy,
    DEFAULT_CURRENCY,
    DEFAULT_MAX_ITEM_TOTAL,
};
