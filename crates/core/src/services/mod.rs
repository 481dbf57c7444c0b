pub mod pnl_service;
pub mod quote_service;
pub mod trade_service;
