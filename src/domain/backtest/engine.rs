//! Backtest orchestration.
//!
//! Composes price lookups, currency conversion, share arithmetic and DRIP
//! simulation for each request shape. Fetches run one after another and the
//! first failure aborts the request; no partial result is ever produced.

use chrono::NaiveDate;
use tracing::{debug, info};

use super::result::{
    BacktestResult, Header, QuantityBuy, QuantityBuySell, QuantityDrip, ValueBuy, ValueBuySell,
    ValueDrip,
};
use super::{BacktestRequest, RawRequest, Shape};
use crate::domain::drip::{self, ConstantPrice, DripResult, ExDatePrice, ReinvestmentPricer};
use crate::domain::error::HindsightError;
use crate::domain::fx::FxConverter;
use crate::domain::position::{return_pct, shares_from_value, value_from_shares};
use crate::domain::settings::{DripPricing, Settings};
use crate::ports::dividend_port::DividendSource;
use crate::ports::fx_port::FxRateSource;
use crate::ports::price_port::PriceSource;

/// Currency bookkeeping for a value-mode request.
struct ValueLeg {
    /// Currency as reported back: the token the user typed, or the asset
    /// currency when the amount carried none.
    display: String,
    /// ISO code used for rate lookups.
    code: String,
    asset_currency: String,
}

pub struct Backtester<'a> {
    prices: &'a dyn PriceSource,
    dividends: &'a dyn DividendSource,
    fx: FxConverter<'a>,
    settings: &'a Settings,
}

impl<'a> Backtester<'a> {
    pub fn new(
        prices: &'a dyn PriceSource,
        dividends: &'a dyn DividendSource,
        fx_rates: &'a dyn FxRateSource,
        settings: &'a Settings,
    ) -> Self {
        Self {
            prices,
            dividends,
            fx: FxConverter::new(fx_rates),
            settings,
        }
    }

    /// Validate and run a raw request.
    pub fn run_raw(&self, raw: &RawRequest) -> Result<BacktestResult, HindsightError> {
        let request = BacktestRequest::from_raw(raw)?;
        self.run(&request)
    }

    pub fn run(&self, req: &BacktestRequest) -> Result<BacktestResult, HindsightError> {
        let shape = req.shape();
        info!(
            ticker = %req.ticker,
            buy_date = %req.buy_date,
            asset_type = %req.asset_type,
            monetary = req.amount.is_monetary_value(),
            ?shape,
            "running backtest"
        );

        let result = match (shape, req.amount.is_monetary_value()) {
            (Shape::BuyOnly, false) => self.quantity_buy(req),
            (Shape::BuyOnly, true) => self.value_buy(req),
            (Shape::BuySell { sell }, false) => self.quantity_buy_sell(req, sell),
            (Shape::BuySell { sell }, true) => self.value_buy_sell(req, sell),
            (Shape::BuySellDrip { sell }, false) => self.quantity_drip(req, sell),
            (Shape::BuySellDrip { sell }, true) => self.value_drip(req, sell),
        }?;

        info!(ticker = %req.ticker, "{}", result.message());
        Ok(result)
    }

    fn quantity_buy(&self, req: &BacktestRequest) -> Result<BacktestResult, HindsightError> {
        let close_price = self.close(&req.ticker, req.buy_date)?;
        Ok(BacktestResult::QuantityBuy(QuantityBuy {
            header: header(req, None),
            quantity: req.amount.magnitude(),
            close_price,
        }))
    }

    fn value_buy(&self, req: &BacktestRequest) -> Result<BacktestResult, HindsightError> {
        let close_price = self.close(&req.ticker, req.buy_date)?;
        let leg = self.value_leg(req);
        let fx_rate = self.fx.rate(&leg.code, &leg.asset_currency, req.buy_date)?;
        let invested = req.amount.magnitude() * fx_rate;
        let shares = shares_from_value(invested, close_price, &req.ticker, req.buy_date)?;

        Ok(BacktestResult::ValueBuy(ValueBuy {
            header: header(req, None),
            value: req.amount.magnitude(),
            currency: leg.display,
            fx_rate,
            shares,
            stock_currency: leg.asset_currency,
            close_price,
        }))
    }

    fn quantity_buy_sell(
        &self,
        req: &BacktestRequest,
        sell: NaiveDate,
    ) -> Result<BacktestResult, HindsightError> {
        let buy_price = self.close(&req.ticker, req.buy_date)?;
        let sell_price = self.close(&req.ticker, sell)?;
        let quantity = req.amount.magnitude();
        let final_value = value_from_shares(quantity, sell_price);

        Ok(BacktestResult::QuantityBuySell(QuantityBuySell {
            header: header(req, Some(sell)),
            quantity,
            buy_price,
            sell_price,
            final_value,
            return_pct: return_pct(value_from_shares(quantity, buy_price), final_value),
        }))
    }

    fn value_buy_sell(
        &self,
        req: &BacktestRequest,
        sell: NaiveDate,
    ) -> Result<BacktestResult, HindsightError> {
        let buy_price = self.close(&req.ticker, req.buy_date)?;
        let sell_price = self.close(&req.ticker, sell)?;
        let leg = self.value_leg(req);
        let fx_rate_buy = self.fx.rate(&leg.code, &leg.asset_currency, req.buy_date)?;
        let fx_rate_sell = self.fx.rate(&leg.asset_currency, &leg.code, sell)?;

        let value = req.amount.magnitude();
        let shares = shares_from_value(value * fx_rate_buy, buy_price, &req.ticker, req.buy_date)?;
        let final_value_in_stock_currency = value_from_shares(shares, sell_price);
        let final_value_in_original_currency = final_value_in_stock_currency * fx_rate_sell;

        Ok(BacktestResult::ValueBuySell(ValueBuySell {
            header: header(req, Some(sell)),
            value,
            currency: leg.display,
            buy_price,
            sell_price,
            fx_rate_buy,
            fx_rate_sell,
            stock_currency: leg.asset_currency,
            shares,
            final_value_in_stock_currency,
            final_value_in_original_currency,
            return_pct: return_pct(value, final_value_in_original_currency),
        }))
    }

    fn quantity_drip(
        &self,
        req: &BacktestRequest,
        sell: NaiveDate,
    ) -> Result<BacktestResult, HindsightError> {
        let buy_price = self.close(&req.ticker, req.buy_date)?;
        let sell_price = self.close(&req.ticker, sell)?;
        let quantity = req.amount.magnitude();
        let drip = self.reinvest(req, sell, quantity, buy_price)?;

        let total_shares = quantity + drip.reinvested_shares;
        let final_value = value_from_shares(total_shares, sell_price);

        Ok(BacktestResult::QuantityDrip(QuantityDrip {
            header: header(req, Some(sell)),
            quantity,
            buy_price,
            sell_price,
            reinvested_shares: drip.reinvested_shares,
            total_shares,
            final_value,
            return_pct: return_pct(value_from_shares(quantity, buy_price), final_value),
            reinvestments: drip.reinvestments,
        }))
    }

    fn value_drip(
        &self,
        req: &BacktestRequest,
        sell: NaiveDate,
    ) -> Result<BacktestResult, HindsightError> {
        let buy_price = self.close(&req.ticker, req.buy_date)?;
        let sell_price = self.close(&req.ticker, sell)?;
        let leg = self.value_leg(req);
        let fx_rate_buy = self.fx.rate(&leg.code, &leg.asset_currency, req.buy_date)?;
        let fx_rate_sell = self.fx.rate(&leg.asset_currency, &leg.code, sell)?;

        let value = req.amount.magnitude();
        let shares = shares_from_value(value * fx_rate_buy, buy_price, &req.ticker, req.buy_date)?;
        let drip = self.reinvest(req, sell, shares, buy_price)?;

        let total_shares = shares + drip.reinvested_shares;
        let final_value_in_stock_currency = value_from_shares(total_shares, sell_price);
        let final_value_in_original_currency = final_value_in_stock_currency * fx_rate_sell;

        Ok(BacktestResult::ValueDrip(ValueDrip {
            header: header(req, Some(sell)),
            value,
            currency: leg.display,
            buy_price,
            sell_price,
            fx_rate_buy,
            fx_rate_sell,
            stock_currency: leg.asset_currency,
            shares,
            reinvested_shares: drip.reinvested_shares,
            total_shares,
            final_value_in_stock_currency,
            final_value_in_original_currency,
            return_pct: return_pct(value, final_value_in_original_currency),
            reinvestments: drip.reinvestments,
        }))
    }

    fn close(&self, ticker: &str, date: NaiveDate) -> Result<f64, HindsightError> {
        debug!(ticker, %date, "fetching close price");
        let price = self.prices.close_price(ticker, date)?;
        if !price.is_finite() || price <= 0.0 {
            return Err(HindsightError::InvalidPrice {
                ticker: ticker.to_string(),
                date,
                price,
            });
        }
        Ok(price)
    }

    fn value_leg(&self, req: &BacktestRequest) -> ValueLeg {
        let asset_currency = self
            .settings
            .asset_currency(&req.ticker, req.asset_type)
            .to_string();

        match (req.amount.currency(), &req.currency_code) {
            (Some(token), Some(code)) => ValueLeg {
                display: token.to_string(),
                code: code.clone(),
                asset_currency,
            },
            _ => ValueLeg {
                display: asset_currency.clone(),
                code: asset_currency.clone(),
                asset_currency,
            },
        }
    }

    fn reinvest(
        &self,
        req: &BacktestRequest,
        sell: NaiveDate,
        initial_shares: f64,
        buy_price: f64,
    ) -> Result<DripResult, HindsightError> {
        debug!(ticker = %req.ticker, from = %req.buy_date, to = %sell, "fetching dividends");
        let schedule = self.dividends.schedule(&req.ticker, req.buy_date, sell)?;
        let events = drip::window(&schedule, req.buy_date, sell);
        debug!(events = events.len(), "dividends in holding window");

        let constant = ConstantPrice(buy_price);
        let ex_date = ExDatePrice {
            source: self.prices,
            ticker: &req.ticker,
        };
        let pricer: &dyn ReinvestmentPricer = match self.settings.drip_pricing {
            DripPricing::Constant => &constant,
            DripPricing::ExDate => &ex_date,
        };

        drip::simulate(&req.ticker, initial_shares, &events, pricer)
    }
}

fn header(req: &BacktestRequest, sell: Option<NaiveDate>) -> Header {
    Header {
        ticker: req.ticker.clone(),
        buy_date: req.buy_date,
        sell_date: sell,
        asset_type: req.asset_type,
    }
}
