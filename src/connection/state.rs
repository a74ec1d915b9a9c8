//! The connection's Mealy state machine (§4.4): a pure `(state, packet) →
//! (state, events)` transition function for everything after the
//! handshake. The handshake/auth exchange (§4.3) is driven separately by
//! [`super::establish`] since it additionally depends on the caller's
//! credentials, not just the bytes on the wire.

use std::sync::Arc;

use crate::column::Column;
use crate::error::{protocol_err, Error};
use crate::io::MySqlBufExt;
use crate::protocol::{self, ColumnDefinition, EofPacket, ErrPacket, OkPacket, Packet};
use crate::row::Row;
use crate::statement::PreparedStatement;
use crate::value::{decode_binary_value, decode_text_value};

/// Where the connection is within one request/response exchange. `Idle`
/// means no command is in flight and a new one may be issued.
#[derive(Debug, Clone)]
pub enum State {
    Idle,
    TextAwaitColumnCount {
        binary: bool,
        statement_id: Option<u32>,
    },
    TextColumns {
        binary: bool,
        total: u16,
        remaining: u16,
        collected: Vec<ColumnDefinition>,
    },
    TextAwaitColumnsEof {
        binary: bool,
        total: u16,
        collected: Vec<ColumnDefinition>,
    },
    TextRows {
        binary: bool,
        columns: Arc<[Column]>,
    },
    StmtAwaitPrepareOk,
    StmtParams {
        remaining: u16,
        num_columns: u16,
        collected: Vec<ColumnDefinition>,
    },
    StmtParamsEof {
        num_columns: u16,
        params: Vec<ColumnDefinition>,
    },
    StmtCols {
        remaining: u16,
        params: Vec<ColumnDefinition>,
        collected: Vec<ColumnDefinition>,
    },
    StmtColsEof {
        params: Vec<ColumnDefinition>,
        columns: Vec<ColumnDefinition>,
    },
    Closed,
}

/// What the executor should deliver to the caller (or do next) as a result
/// of one transition.
#[derive(Debug)]
pub enum Event {
    Row(Row),
    End {
        affected_rows: u64,
        last_insert_id: u64,
    },
    PreparedStatement(PreparedStatement),
    ServerError(Error),
}

fn to_columns(defs: Vec<ColumnDefinition>) -> Arc<[Column]> {
    defs.into_iter()
        .enumerate()
        .map(|(i, d)| Column::from_definition(d, i))
        .collect()
}

/// True when the first byte / length of `packet` is shaped like an OK
/// packet carrying `0xFE` as its header (the `DEPRECATE_EOF` convention),
/// as opposed to a genuine (short) EOF packet.
fn is_ok_with_eof_header(packet: &Packet, deprecate_eof: bool) -> bool {
    deprecate_eof && packet.first_byte() == Some(0xFE) && packet.payload.len() >= 7
}

/// Advances the state machine by one inbound `packet`. `deprecate_eof`
/// reflects whether `DEPRECATE_EOF` was negotiated for this connection,
/// since it changes how EOF-shaped packets are interpreted mid-result-set.
pub fn transition(state: State, packet: &Packet, deprecate_eof: bool) -> Result<(State, Vec<Event>), Error> {
    let first_byte = packet.first_byte();

    match state {
        State::Idle => Err(protocol_err!("unexpected packet while connection is idle")),

        State::TextAwaitColumnCount { binary, statement_id } => {
            let _ = statement_id;

            if first_byte == Some(protocol::ERR_HEADER) {
                let err = ErrPacket::read(&packet.payload)?;
                return Ok((State::Idle, vec![Event::ServerError(err.into_server_error())]));
            }

            if first_byte == Some(protocol::OK_HEADER) {
                let ok = OkPacket::read(&packet.payload)?;
                return Ok((
                    State::Idle,
                    vec![Event::End {
                        affected_rows: ok.affected_rows,
                        last_insert_id: ok.last_insert_id,
                    }],
                ));
            }

            let mut buf = &packet.payload[..];
            let count = buf
                .get_uint_lenenc()?
                .ok_or_else(|| protocol_err!("expected a column count, got NULL"))?;
            let count = u16::try_from(count).map_err(|_| protocol_err!("implausible column count {}", count))?;

            if count == 0 {
                return Ok((State::Idle, vec![]));
            }

            Ok((
                State::TextColumns {
                    binary,
                    total: count,
                    remaining: count,
                    collected: Vec::with_capacity(count as usize),
                },
                vec![],
            ))
        }

        State::TextColumns { binary, total, remaining, mut collected } => {
            let def = ColumnDefinition::read(&packet.payload)?;
            collected.push(def);

            if remaining > 1 {
                Ok((
                    State::TextColumns {
                        binary,
                        total,
                        remaining: remaining - 1,
                        collected,
                    },
                    vec![],
                ))
            } else if !deprecate_eof {
                Ok((State::TextAwaitColumnsEof { binary, total, collected }, vec![]))
            } else {
                let columns = to_columns(collected);
                Ok((State::TextRows { binary, columns }, vec![]))
            }
        }

        State::TextAwaitColumnsEof { binary, total, collected } => {
            let _ = total;
            EofPacket::read(&packet.payload)?;
            let columns = to_columns(collected);
            Ok((State::TextRows { binary, columns }, vec![]))
        }

        State::TextRows { binary, columns } => {
            let is_terminator = EofPacket::looks_like_eof(first_byte.unwrap_or(0), packet.payload.len())
                || is_ok_with_eof_header(packet, deprecate_eof);

            if is_terminator {
                let (affected_rows, last_insert_id) = if deprecate_eof {
                    let ok = OkPacket::read(&packet.payload)?;
                    (ok.affected_rows, ok.last_insert_id)
                } else {
                    let eof = EofPacket::read(&packet.payload)?;
                    let _ = eof;
                    (0, 0)
                };

                return Ok((
                    State::Idle,
                    vec![Event::End {
                        affected_rows,
                        last_insert_id,
                    }],
                ));
            }

            let raw_values = if binary {
                let field_types: Vec<_> = columns.iter().map(|c| c.field_type).collect();
                protocol::decode_binary_row(&packet.payload, &field_types)?
            } else {
                protocol::decode_text_row(&packet.payload, columns.len())?
            };

            let mut values = Vec::with_capacity(raw_values.len());
            for (raw, column) in raw_values.into_iter().zip(columns.iter()) {
                let value = match raw {
                    None => crate::value::Value::Null,
                    Some(bytes) if binary => decode_binary_value(column.field_type, &bytes)?,
                    Some(bytes) => decode_text_value(column.field_type, &bytes)?,
                };
                values.push(value);
            }

            let row = Row::new(Arc::clone(&columns), values);
            Ok((State::TextRows { binary, columns }, vec![Event::Row(row)]))
        }

        State::StmtAwaitPrepareOk => {
            if first_byte == Some(protocol::ERR_HEADER) {
                let err = ErrPacket::read(&packet.payload)?;
                return Ok((State::Idle, vec![Event::ServerError(err.into_server_error())]));
            }

            let ok = protocol::ComStmtPrepareOk::read(&packet.payload)?;

            if ok.params > 0 {
                Ok((
                    State::StmtParams {
                        remaining: ok.params,
                        num_columns: ok.columns,
                        collected: Vec::with_capacity(ok.params as usize),
                    },
                    vec![],
                ))
            } else if ok.columns > 0 {
                Ok((
                    State::StmtCols {
                        remaining: ok.columns,
                        params: Vec::new(),
                        collected: Vec::with_capacity(ok.columns as usize),
                    },
                    vec![],
                ))
            } else {
                let statement = PreparedStatement {
                    id: ok.statement_id,
                    parameters: Arc::from(Vec::new()),
                    columns: Arc::from(Vec::new()),
                };
                Ok((State::Idle, vec![Event::PreparedStatement(statement)]))
            }
        }

        State::StmtParams { remaining, num_columns, mut collected } => {
            let def = ColumnDefinition::read(&packet.payload)?;
            collected.push(def);

            if remaining > 1 {
                Ok((
                    State::StmtParams {
                        remaining: remaining - 1,
                        num_columns,
                        collected,
                    },
                    vec![],
                ))
            } else if !deprecate_eof {
                Ok((
                    State::StmtParamsEof {
                        num_columns,
                        params: collected,
                    },
                    vec![],
                ))
            } else {
                advance_past_params(collected, num_columns)
            }
        }

        State::StmtParamsEof { num_columns, params } => {
            EofPacket::read(&packet.payload)?;
            advance_past_params(params, num_columns)
        }

        State::StmtColsEof { params, columns } => {
            EofPacket::read(&packet.payload)?;
            Ok(finish_prepare(params, columns))
        }

        State::StmtCols { remaining, params, mut collected } => {
            let def = ColumnDefinition::read(&packet.payload)?;
            collected.push(def);

            if remaining > 1 {
                Ok((
                    State::StmtCols {
                        remaining: remaining - 1,
                        params,
                        collected,
                    },
                    vec![],
                ))
            } else if !deprecate_eof {
                finish_prepare_after_columns_eof_pending(params, collected)
            } else {
                Ok(finish_prepare(params, collected))
            }
        }

        State::Closed => Err(protocol_err!("connection is closed")),
    }
}

fn advance_past_params(params: Vec<ColumnDefinition>, num_columns: u16) -> Result<(State, Vec<Event>), Error> {
    if num_columns > 0 {
        Ok((
            State::StmtCols {
                remaining: num_columns,
                params,
                collected: Vec::with_capacity(num_columns as usize),
            },
            vec![],
        ))
    } else {
        Ok(finish_prepare(params, Vec::new()))
    }
}

/// Columns finished arriving but a trailing EOF is still expected before
/// the statement is deliverable (non-`DEPRECATE_EOF` path).
fn finish_prepare_after_columns_eof_pending(
    params: Vec<ColumnDefinition>,
    collected: Vec<ColumnDefinition>,
) -> Result<(State, Vec<Event>), Error> {
    Ok((State::StmtColsEof { params, columns: collected }, vec![]))
}

fn finish_prepare(params: Vec<ColumnDefinition>, columns: Vec<ColumnDefinition>) -> (State, Vec<Event>) {
    let statement_id_placeholder = 0; // overwritten by the executor, which knows the real id
    let statement = PreparedStatement {
        id: statement_id_placeholder,
        parameters: to_columns(params),
        columns: to_columns(columns),
    };
    (State::Idle, vec![Event::PreparedStatement(statement)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MySqlBufMutExt;
    use bytes::Bytes;

    fn packet(seq: u8, payload: Vec<u8>) -> Packet {
        Packet {
            sequence_id: seq,
            payload: Bytes::from(payload),
        }
    }

    fn column_definition(name: &str, field_type_code: u8) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.put_str_lenenc("def");
        buf.put_str_lenenc("mydb");
        buf.put_str_lenenc("t");
        buf.put_str_lenenc("t");
        buf.put_str_lenenc(name);
        buf.put_str_lenenc(name);
        buf.put_uint_lenenc(0x0c);
        buf.put_u16_le(63);
        buf.put_u32_le(11);
        buf.put_u8(field_type_code);
        buf.put_u16_le(0);
        buf.put_u8(0);
        buf
    }

    fn eof_packet() -> Vec<u8> {
        vec![0xFE, 0x00, 0x00, 0x02, 0x00]
    }

    fn prepare_ok(statement_id: u32, columns: u16, params: u16) -> Vec<u8> {
        let mut buf = vec![0x00];
        buf.extend_from_slice(&statement_id.to_le_bytes());
        buf.extend_from_slice(&columns.to_le_bytes());
        buf.extend_from_slice(&params.to_le_bytes());
        buf.push(0); // filler
        buf.extend_from_slice(&0u16.to_le_bytes()); // warnings
        buf
    }

    /// A server that hasn't negotiated `DEPRECATE_EOF` sends params, an EOF,
    /// then columns, then a second EOF. The params and columns must not be
    /// mixed up when the statement is finally assembled.
    #[test]
    fn prepare_without_deprecate_eof_keeps_params_and_columns_separate() {
        let mut state = State::StmtAwaitPrepareOk;

        let steps: Vec<Vec<u8>> = vec![
            prepare_ok(7, 1, 1),
            column_definition("p1", 3),
            eof_packet(),
            column_definition("c1", 253),
            eof_packet(),
        ];

        let mut statement = None;
        for (i, payload) in steps.into_iter().enumerate() {
            let (next_state, events) = transition(state, &packet(i as u8, payload), false).unwrap();
            state = next_state;
            for event in events {
                if let Event::PreparedStatement(s) = event {
                    statement = Some(s);
                }
            }
        }

        let statement = statement.expect("prepare flow completes");
        assert_eq!(statement.parameters.len(), 1);
        assert_eq!(statement.parameters[0].name, "p1");
        assert_eq!(statement.columns.len(), 1);
        assert_eq!(statement.columns[0].name, "c1");
        assert!(matches!(state, State::Idle));
    }
}
