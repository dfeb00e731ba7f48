pub mod shared {
    pub mod core {
        pub mod primitives;
    }
    pub mod infrastructure {
        pub mod background;
        pub mod document_store;
        pub mod mailer;
    }
}

pub mod modules {
    pub mod tickets {
        pub mod core {
            pub mod claim;
            pub mod comment;
            pub mod customer;
            pub mod errors;
            pub mod log_time;
            pub mod notification;
            pub mod policy;
            pub mod ticket;
            pub mod time_log_record;
        }
        pub mod adapters {
            pub mod inbound {
                pub mod claim_extractor;
            }
            pub mod outbound {
                pub mod audit_trail;
                pub mod balance_settlement;
                pub mod notifier;
            }
        }
        pub mod use_cases {
            pub mod context;
            pub mod errors;
            pub mod track_time {
                pub mod command;
                pub mod handler;
                pub mod inbound {
                    pub mod http;
                }
            }
            pub mod comment_on_ticket {
                pub mod command;
                pub mod handler;
                pub mod inbound {
                    pub mod http;
                }
            }
            pub mod change_ticket_status {
                pub mod handler;
                pub mod inbound {
                    pub mod http;
                }
            }
            pub mod open_ticket {
                pub mod command;
                pub mod handler;
                pub mod inbound {
                    pub mod http;
                }
            }
            pub mod report_time {
                pub mod handler;
                pub mod projection;
                pub mod inbound {
                    pub mod graphql;
                    pub mod http;
                }
            }
            pub mod reconcile_balances {
                pub mod handler;
                pub mod inbound {
                    pub mod http;
                }
            }
        }
    }
}

pub mod shell;

#[cfg(test)]
pub mod tests {
    pub mod fixtures;

    pub mod e2e {
        pub mod time_tracking_lifecycle_tests;
    }
}
