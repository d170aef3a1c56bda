pub mod a025_return_order;
