//! MCP tool implementations
//!
//! Seven tools over the shared [`ReservationService`]:
//! - booking: check_availability, get_available_timeslots, book_table, cancel_reservation
//! - browsing: view_reservations
//! - retrieval: search, fetch
//!
//! Every transport (stdio, `/rpc`, SSE sessions, REST) goes through
//! [`ToolHandler::execute`]; transports only decide how a reply or error is
//! put on the wire.

use crate::error::{Result, TablebookError};
use crate::mcp::{input, render};
use crate::service::ReservationService;
use crate::types::{BookingRequest, ContactDetails, ReservationQuery, StatusFilter};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

/// Tool schema definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tool {
    /// Tool name (e.g., "book_table")
    pub name: String,

    /// Human-readable description
    pub description: String,

    /// JSON Schema for input parameters
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Outcome of a successful tool call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolReply {
    /// Chat-style rendering
    pub text: String,

    /// Structured result
    pub data: Value,
}

/// Tool handler that dispatches to the reservation service
pub struct ToolHandler {
    service: Arc<ReservationService>,
}

impl ToolHandler {
    /// Create a new tool handler
    pub fn new(service: Arc<ReservationService>) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &Arc<ReservationService> {
        &self.service
    }

    /// Get list of all available tools
    pub fn list_tools(&self) -> Vec<Tool> {
        vec![
            Tool {
                name: "check_availability".to_string(),
                description: "Check which tables are free for a party at a specific date and time.".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "date": {
                            "type": "string",
                            "description": "Date (YYYY-MM-DD, MM/DD/YYYY or 'November 15, 2025')"
                        },
                        "time_slot": {
                            "type": "string",
                            "description": "Time (e.g., '19:00', '7pm', '7:30 PM')"
                        },
                        "party_size": {
                            "type": "integer",
                            "description": "Number of guests"
                        }
                    },
                    "required": ["date", "time_slot", "party_size"]
                }),
            },
            Tool {
                name: "book_table".to_string(),
                description: "Book the smallest-numbered free table that seats the party. Returns the reservation ID.".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "customer_name": {
                            "type": "string",
                            "description": "Name for the reservation"
                        },
                        "date": {
                            "type": "string",
                            "description": "Date (YYYY-MM-DD)"
                        },
                        "time_slot": {
                            "type": "string",
                            "description": "Time (e.g., '19:00' or '7pm')"
                        },
                        "party_size": {
                            "type": "integer",
                            "description": "Number of guests",
                            "minimum": 1,
                            "maximum": self.service.policy().max_party_size
                        },
                        "phone": {
                            "type": "string",
                            "description": "Optional contact phone"
                        },
                        "email": {
                            "type": "string",
                            "description": "Optional contact email"
                        },
                        "notes": {
                            "type": "string",
                            "description": "Optional special requests"
                        }
                    },
                    "required": ["customer_name", "date", "time_slot", "party_size"]
                }),
            },
            Tool {
                name: "cancel_reservation".to_string(),
                description: "Cancel an existing reservation by ID. The table becomes bookable again.".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "reservation_id": {
                            "type": "string",
                            "description": "Reservation ID (e.g., 'RES0001')"
                        }
                    },
                    "required": ["reservation_id"]
                }),
            },
            Tool {
                name: "view_reservations".to_string(),
                description: "List reservations, optionally filtered by date, status or customer name, sorted by date and time.".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "date": {
                            "type": "string",
                            "description": "Only reservations on this date"
                        },
                        "status": {
                            "type": "string",
                            "enum": ["all", "active", "cancelled"],
                            "default": "all"
                        },
                        "customer_name": {
                            "type": "string",
                            "description": "Case-insensitive partial name match"
                        }
                    }
                }),
            },
            Tool {
                name: "get_available_timeslots".to_string(),
                description: "List every time slot on a date that can still seat the party.".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "date": {
                            "type": "string",
                            "description": "Date (YYYY-MM-DD)"
                        },
                        "party_size": {
                            "type": "integer",
                            "description": "Number of guests"
                        }
                    },
                    "required": ["date", "party_size"]
                }),
            },
            Tool {
                name: "search".to_string(),
                description: "Search reservations by customer name, date or status.".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "Text to look for"
                        }
                    },
                    "required": ["query"]
                }),
            },
            Tool {
                name: "fetch".to_string(),
                description: "Fetch a full record by reservation ID ('RES0001') or table reference ('table-3').".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "id": {
                            "type": "string",
                            "description": "Reservation ID or table reference"
                        }
                    },
                    "required": ["id"]
                }),
            },
        ]
    }

    /// Execute a tool call
    pub async fn execute(&self, tool_name: &str, params: Value) -> Result<ToolReply> {
        debug!("Executing tool: {}", tool_name);

        match tool_name {
            "check_availability" => self.check_availability(params).await,
            "book_table" => self.book_table(params).await,
            "cancel_reservation" => self.cancel_reservation(params).await,
            "view_reservations" => self.view_reservations(params).await,
            "get_available_timeslots" => self.get_available_timeslots(params).await,
            "search" => self.search(params).await,
            "fetch" => self.fetch(params).await,
            _ => {
                warn!("Unknown tool: {}", tool_name);
                Err(TablebookError::UnknownTool(tool_name.to_string()))
            }
        }
    }

    /// User-facing message for a failed call
    pub fn describe_error(&self, error: &TablebookError) -> String {
        render::failure(error, self.service.catalog().time_slots())
    }

    async fn check_availability(&self, params: Value) -> Result<ToolReply> {
        #[derive(Deserialize)]
        struct CheckAvailabilityParams {
            date: String,
            #[serde(alias = "time_str", alias = "time")]
            time_slot: String,
            party_size: i64,
        }

        let params: CheckAvailabilityParams = decode("check_availability", params)?;
        let date = input::normalize_date(&params.date);
        let time_slot = input::normalize_time(&params.time_slot);

        if !self.service.catalog().is_valid_slot(&time_slot) {
            return Err(TablebookError::InvalidTimeSlot(time_slot));
        }

        let tables = self
            .service
            .available_tables(&date, &time_slot, params.party_size)
            .await;

        Ok(ToolReply {
            text: render::availability(&date, &time_slot, params.party_size, &tables),
            data: json!({
                "date": date,
                "time_slot": time_slot,
                "party_size": params.party_size,
                "available": !tables.is_empty(),
                "tables": tables,
            }),
        })
    }

    async fn book_table(&self, params: Value) -> Result<ToolReply> {
        #[derive(Deserialize)]
        struct BookTableParams {
            #[serde(alias = "name")]
            customer_name: String,
            date: String,
            #[serde(alias = "time_str", alias = "time")]
            time_slot: String,
            party_size: i64,
            phone: Option<String>,
            email: Option<String>,
            notes: Option<String>,
        }

        let params: BookTableParams = decode("book_table", params)?;
        let request = BookingRequest::new(
            params.customer_name,
            input::normalize_date(&params.date),
            input::normalize_time(&params.time_slot),
            params.party_size,
        )
        .with_contact(ContactDetails {
            phone: params.phone,
            email: params.email,
            notes: params.notes,
        });

        let reservation = self.service.book(request).await?;
        let table = self.service.catalog().table(reservation.table_number);

        Ok(ToolReply {
            text: render::booking_confirmed(&reservation, table),
            data: serde_json::to_value(&reservation)?,
        })
    }

    async fn cancel_reservation(&self, params: Value) -> Result<ToolReply> {
        #[derive(Deserialize)]
        struct CancelParams {
            #[serde(alias = "id")]
            reservation_id: String,
        }

        let params: CancelParams = decode("cancel_reservation", params)?;
        let reservation_id = input::normalize_reservation_id(&params.reservation_id);

        let reservation = self.service.cancel(&reservation_id).await?;

        Ok(ToolReply {
            text: render::cancelled(&reservation),
            data: serde_json::to_value(&reservation)?,
        })
    }

    async fn view_reservations(&self, params: Value) -> Result<ToolReply> {
        #[derive(Deserialize)]
        struct ViewParams {
            date: Option<String>,
            status: Option<String>,
            #[serde(alias = "name")]
            customer_name: Option<String>,
        }

        let params: ViewParams = decode("view_reservations", params)?;

        let status = match params.status.as_deref() {
            Some(raw) => raw
                .parse::<StatusFilter>()
                .map_err(TablebookError::InvalidArgument)?,
            None => StatusFilter::All,
        };

        let mut query = ReservationQuery::all().with_status(status);
        if let Some(date) = params.date.as_deref().filter(|d| !d.trim().is_empty()) {
            query.date = Some(input::normalize_date(date));
        }
        if let Some(name) = params.customer_name.filter(|n| !n.trim().is_empty()) {
            query = query.with_customer(name);
        }

        let reservations = self.service.view(&query).await;

        Ok(ToolReply {
            text: render::reservations(&reservations, self.service.catalog().tables()),
            data: json!({
                "count": reservations.len(),
                "reservations": reservations,
            }),
        })
    }

    async fn get_available_timeslots(&self, params: Value) -> Result<ToolReply> {
        #[derive(Deserialize)]
        struct TimeslotsParams {
            date: String,
            party_size: i64,
        }

        let params: TimeslotsParams = decode("get_available_timeslots", params)?;
        let date = input::normalize_date(&params.date);
        self.service.policy().validate_party_size(params.party_size)?;

        let slots = self
            .service
            .available_time_slots(&date, params.party_size)
            .await;

        Ok(ToolReply {
            text: render::time_slots(&date, params.party_size, &slots),
            data: json!({
                "date": date,
                "party_size": params.party_size,
                "time_slots": slots,
            }),
        })
    }

    async fn search(&self, params: Value) -> Result<ToolReply> {
        #[derive(Deserialize)]
        struct SearchParams {
            #[serde(default)]
            query: String,
        }

        let params: SearchParams = decode("search", params)?;
        let hits = self.service.search(&params.query).await;

        Ok(ToolReply {
            text: render::search_hits(&params.query, &hits),
            data: json!({ "results": hits }),
        })
    }

    async fn fetch(&self, params: Value) -> Result<ToolReply> {
        #[derive(Deserialize)]
        struct FetchParams {
            #[serde(alias = "reservation_id")]
            id: String,
        }

        let params: FetchParams = decode("fetch", params)?;
        let document = self.service.fetch(&params.id).await?;

        Ok(ToolReply {
            text: render::document(&document),
            data: serde_json::to_value(&document)?,
        })
    }
}

/// Decode tool arguments; absent arguments count as an empty object
fn decode<T: DeserializeOwned>(tool_name: &str, params: Value) -> Result<T> {
    let params = if params.is_null() { json!({}) } else { params };
    serde_json::from_value(params).map_err(|e| {
        TablebookError::InvalidArgument(format!("invalid arguments for {}: {}", tool_name, e))
    })
}
