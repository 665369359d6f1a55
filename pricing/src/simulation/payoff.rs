use crate::common::numeric::PayoffValue;

/// max(asset - strike, 0)
#[inline]
pub fn call_payoff<N: PayoffValue>(asset_price: N, strike: N) -> N {
    (asset_price - strike).floor_at_zero()
}

/// max(strike - asset, 0)
#[inline]
pub fn put_payoff<N: PayoffValue>(asset_price: N, strike: N) -> N {
    (strike - asset_price).floor_at_zero()
}
