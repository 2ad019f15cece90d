pub mod aggregate_id;
