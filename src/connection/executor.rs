//! The connection's public request API (§4.5): `query`, `prepare`,
//! `execute`, `close_statement`, `ping`, `close`, each driving
//! [`super::state`]'s pure transition function against the framed
//! transport.

use crate::connection::establish::establish;
use crate::connection::state::{transition, Event, State};
use crate::connection::stream::{MySqlStream, Socket};
use crate::error::Error;
use crate::options::MySqlConnectOptions;
use crate::protocol::{
    self, CursorType, ComPing, ComQuery, ComQuit, ComStmtClose, ComStmtExecute, ComStmtPrepare,
    ComStmtReset, Capabilities, ErrPacket, OkPacket,
};
use crate::row::Row;
use crate::statement::{encode_bind, Bind, PreparedStatement};

/// One live MySQL/MariaDB connection. At most one command may be in flight
/// at a time (§4.5 contract); a second attempt fails with
/// [`Error::ConnectionInUse`] before any bytes are sent.
pub struct Connection {
    stream: MySqlStream,
    capabilities: Capabilities,
    server_version: String,
    connection_id: u32,
    busy: bool,
    closed: bool,
    /// Left behind by a [`QueryStream`] that was dropped before exhausting
    /// its result set. Drained lazily by [`Connection::reset`] the next time
    /// this connection is asked to do anything, per the cancellation
    /// contract in §5 (drain to `Idle`, or fail to `Closed`).
    pending_state: Option<State>,
}

impl Connection {
    pub async fn connect(options: &MySqlConnectOptions) -> Result<Connection, Error> {
        let stream = MySqlStream::connect_tcp(&options.hostname, options.port).await?;
        Self::handshake(stream, options).await
    }

    /// Runs the handshake over an already-established byte stream rather
    /// than opening a TCP connection. The seam a caller upgrades to TLS
    /// through: `options.tls` only describes *whether* TLS is wanted (for
    /// callers to check before connecting), not how to perform it. A caller
    /// wanting TLS establishes it with whatever client TLS stack it already
    /// depends on, then hands the wrapped stream here; this crate never
    /// negotiates TLS itself.
    pub async fn connect_with_socket(socket: impl Socket, options: &MySqlConnectOptions) -> Result<Connection, Error> {
        Self::handshake(MySqlStream::new(socket), options).await
    }

    async fn handshake(mut stream: MySqlStream, options: &MySqlConnectOptions) -> Result<Connection, Error> {
        let established = establish(&mut stream, options).await?;

        Ok(Connection {
            stream,
            capabilities: established.capabilities,
            server_version: established.server_version,
            connection_id: established.connection_id,
            busy: false,
            closed: false,
            pending_state: None,
        })
    }

    pub fn server_version(&self) -> &str {
        &self.server_version
    }

    pub fn connection_id(&self) -> u32 {
        self.connection_id
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn deprecate_eof(&self) -> bool {
        self.capabilities.contains(Capabilities::DEPRECATE_EOF)
    }

    /// Drains any result set abandoned by a dropped [`QueryStream`] until the
    /// connection reaches `Idle`. A no-op when nothing is pending.
    pub async fn reset(&mut self) -> Result<(), Error> {
        while let Some(state) = self.pending_state.take() {
            if matches!(state, State::Idle) {
                self.busy = false;
                return Ok(());
            }

            let packet = match self.stream.read_packet().await {
                Ok(packet) => packet,
                Err(e) => {
                    self.closed = true;
                    self.busy = false;
                    return Err(e);
                }
            };

            match transition(state, &packet, self.deprecate_eof()) {
                Ok((next_state, _events)) => {
                    if matches!(next_state, State::Idle) {
                        self.busy = false;
                        return Ok(());
                    }
                    self.pending_state = Some(next_state);
                }
                Err(e) => {
                    self.closed = true;
                    self.busy = false;
                    return Err(e);
                }
            }
        }

        Ok(())
    }

    fn begin(&mut self) -> Result<(), Error> {
        if self.closed {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "connection is closed",
            )));
        }
        if self.busy {
            return Err(Error::ConnectionInUse);
        }
        self.busy = true;
        self.stream.begin_command();
        Ok(())
    }

    async fn send(&mut self, payload: &[u8]) -> Result<(), Error> {
        self.stream.write_packet(payload);
        if let Err(e) = self.stream.flush().await {
            self.closed = true;
            self.busy = false;
            return Err(e);
        }
        Ok(())
    }

    /// Runs a plain-text query (§4.5). Rows and the final
    /// `{affected_rows, last_insert_id}` are pulled on demand from the
    /// returned [`QueryStream`].
    pub async fn query(&mut self, sql: &str) -> Result<QueryStream<'_>, Error> {
        self.reset().await?;
        self.begin()?;

        let mut payload = Vec::new();
        ComQuery { query: sql }.encode(&mut payload);
        self.send(&payload).await?;

        Ok(QueryStream::new(
            self,
            State::TextAwaitColumnCount {
                binary: false,
                statement_id: None,
            },
        ))
    }

    /// Prepares `sql` on the server, returning the statement's parameter and
    /// result column metadata.
    pub async fn prepare(&mut self, sql: &str) -> Result<PreparedStatement, Error> {
        self.reset().await?;
        self.begin()?;

        let mut payload = Vec::new();
        ComStmtPrepare { query: sql }.encode(&mut payload);
        self.send(&payload).await?;

        let mut state = State::StmtAwaitPrepareOk;
        let mut statement_id = 0u32;

        loop {
            let packet = match self.stream.read_packet().await {
                Ok(packet) => packet,
                Err(e) => {
                    self.closed = true;
                    self.busy = false;
                    return Err(e);
                }
            };

            if matches!(state, State::StmtAwaitPrepareOk) && packet.first_byte() != Some(protocol::ERR_HEADER) {
                statement_id = protocol::ComStmtPrepareOk::read(&packet.payload)?.statement_id;
            }

            match transition(state, &packet, self.deprecate_eof()) {
                Ok((next_state, events)) => {
                    for event in events {
                        match event {
                            Event::PreparedStatement(mut statement) => {
                                statement.id = statement_id;
                                self.busy = false;
                                return Ok(statement);
                            }
                            Event::ServerError(e) => {
                                self.busy = false;
                                return Err(e);
                            }
                            Event::Row(_) | Event::End { .. } => {
                                unreachable!("the prepare flow never emits row/end events")
                            }
                        }
                    }
                    state = next_state;
                }
                Err(e) => {
                    self.closed = true;
                    self.busy = false;
                    return Err(e);
                }
            }
        }
    }

    /// Executes `statement` with `bind`'s values (§4.5). Validated against
    /// the statement's declared parameter types before anything is sent;
    /// a mismatch fails synchronously with no transport effect.
    pub async fn execute(&mut self, statement: &PreparedStatement, bind: &Bind) -> Result<QueryStream<'_>, Error> {
        let encoded = encode_bind(statement, bind)?;

        self.reset().await?;
        self.begin()?;

        let mut payload = Vec::new();
        ComStmtExecute {
            statement_id: statement.id,
            cursor: CursorType::NO_CURSOR,
            params: &encoded.values,
            null_bitmap: &encoded.null_bitmap,
            param_types: &encoded.param_types,
        }
        .encode(&mut payload);
        self.send(&payload).await?;

        Ok(QueryStream::new(
            self,
            State::TextAwaitColumnCount {
                binary: true,
                statement_id: Some(statement.id),
            },
        ))
    }

    /// Deallocates `statement` on the server. The server sends no response
    /// to `COM_STMT_CLOSE`, so this resolves as soon as the request is on
    /// the wire.
    pub async fn close_statement(&mut self, statement: &PreparedStatement) -> Result<(), Error> {
        if self.closed {
            return Ok(());
        }
        if self.busy {
            return Err(Error::ConnectionInUse);
        }

        self.stream.begin_command();
        let mut payload = Vec::new();
        ComStmtClose { statement_id: statement.id }.encode(&mut payload);
        self.send(&payload).await
    }

    /// Clears `statement`'s accumulated bindings and any open cursor without
    /// deallocating it, so it can be bound and executed again from a clean
    /// slate. Unlike `close_statement`, the server replies with an `OK`.
    pub async fn reset_statement(&mut self, statement: &PreparedStatement) -> Result<(), Error> {
        self.reset().await?;
        self.begin()?;

        let mut payload = Vec::new();
        ComStmtReset { statement_id: statement.id }.encode(&mut payload);
        self.send(&payload).await?;

        let packet = match self.stream.read_packet().await {
            Ok(packet) => packet,
            Err(e) => {
                self.closed = true;
                self.busy = false;
                return Err(e);
            }
        };

        self.busy = false;

        match packet.first_byte() {
            Some(protocol::OK_HEADER) => {
                OkPacket::read(&packet.payload)?;
                Ok(())
            }
            Some(protocol::ERR_HEADER) => Err(ErrPacket::read(&packet.payload)?.into_server_error()),
            _ => {
                self.closed = true;
                Err(Error::UnexpectedResponse)
            }
        }
    }

    /// Sends `COM_PING` and awaits the server's `OK`. Used by the pool's
    /// idle health check before an idle connection is handed to a waiter.
    pub async fn ping(&mut self) -> Result<(), Error> {
        self.reset().await?;
        self.begin()?;

        let mut payload = Vec::new();
        ComPing.encode(&mut payload);
        self.send(&payload).await?;

        let packet = match self.stream.read_packet().await {
            Ok(packet) => packet,
            Err(e) => {
                self.closed = true;
                self.busy = false;
                return Err(e);
            }
        };

        self.busy = false;

        match packet.first_byte() {
            Some(protocol::OK_HEADER) => {
                OkPacket::read(&packet.payload)?;
                Ok(())
            }
            Some(protocol::ERR_HEADER) => Err(ErrPacket::read(&packet.payload)?.into_server_error()),
            _ => {
                self.closed = true;
                Err(Error::UnexpectedResponse)
            }
        }
    }

    /// Sends `COM_QUIT` and shuts the transport down. The server never
    /// replies to `COM_QUIT`; this never emits further events.
    pub async fn close(mut self) -> Result<(), Error> {
        if !self.closed {
            self.stream.begin_command();
            let mut payload = Vec::new();
            ComQuit.encode(&mut payload);
            self.stream.write_packet(&payload);
            let _ = self.stream.flush().await;
        }
        self.stream.shutdown().await
    }
}

/// A pulled-on-demand result set from [`Connection::query`] or
/// [`Connection::execute`]. Borrows the connection for its lifetime, which
/// statically prevents a second command from being issued while one is
/// still in flight.
pub struct QueryStream<'a> {
    connection: &'a mut Connection,
    state: Option<State>,
    final_result: Option<(u64, u64)>,
    done: bool,
}

impl<'a> QueryStream<'a> {
    fn new(connection: &'a mut Connection, initial: State) -> QueryStream<'a> {
        QueryStream {
            connection,
            state: Some(initial),
            final_result: None,
            done: false,
        }
    }

    /// Pulls the next row, or `None` once the result set (and its final
    /// `{affected_rows, last_insert_id}`) has been fully delivered.
    pub async fn next(&mut self) -> Result<Option<Row>, Error> {
        loop {
            if self.done {
                return Ok(None);
            }

            let state = self.state.take().expect("state present while stream is not done");

            let packet = match self.connection.stream.read_packet().await {
                Ok(packet) => packet,
                Err(e) => {
                    self.connection.closed = true;
                    self.connection.busy = false;
                    self.done = true;
                    return Err(e);
                }
            };

            match transition(state, &packet, self.connection.deprecate_eof()) {
                Ok((next_state, events)) => {
                    let reached_idle = matches!(next_state, State::Idle);
                    self.state = Some(next_state);

                    for event in events {
                        match event {
                            Event::Row(row) => return Ok(Some(row)),
                            Event::End {
                                affected_rows,
                                last_insert_id,
                            } => {
                                self.final_result = Some((affected_rows, last_insert_id));
                            }
                            Event::ServerError(e) => {
                                self.done = true;
                                self.connection.busy = false;
                                return Err(e);
                            }
                            Event::PreparedStatement(_) => {
                                unreachable!("the query/execute flow never emits a prepared statement")
                            }
                        }
                    }

                    if reached_idle {
                        self.done = true;
                        self.connection.busy = false;
                        return Ok(None);
                    }
                }
                Err(e) => {
                    self.done = true;
                    self.connection.closed = true;
                    self.connection.busy = false;
                    return Err(e);
                }
            }
        }
    }

    pub fn affected_rows(&self) -> u64 {
        self.final_result.map(|(rows, _)| rows).unwrap_or(0)
    }

    pub fn last_insert_id(&self) -> u64 {
        self.final_result.map(|(_, id)| id).unwrap_or(0)
    }
}

impl Drop for QueryStream<'_> {
    /// A stream abandoned mid-result leaves its state behind on the
    /// connection for [`Connection::reset`] to drain before the next
    /// command, rather than leaving the connection wedged.
    fn drop(&mut self) {
        if !self.done {
            self.connection.pending_state = self.state.take();
        }
    }
}
