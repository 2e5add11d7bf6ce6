use std::pin::Pin;
use std::sync::Arc;

use axum::{
    Extension,
    extract::{
        Path, Query, State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt, stream::SplitSink};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::{
    api::http::repos::resolve_view_context,
    app::{middleware::ViewerContext, state::AppState},
    clients::repos::RepoDirectory,
    dto::repos::{EmptyStateResponse, RepoListQueryState},
    models::repos::{ConfiguredFilter, ListedRepo, SortColumn},
    usecases::{
        repo_list::{LOAD_MORE_LABEL, ListViewContext, RepoListService},
        repo_session::{RepoListController, SessionCommand, SessionEvent},
    },
};

/// Interaction events the dashboard relays over the socket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum ClientMessage {
    Search { term: String },
    Sort { column: SortColumn },
    Filter { value: ConfiguredFilter },
    LoadMore,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum ServerMessage<'a> {
    Rows {
        rows: &'a [ListedRepo],
        #[serde(skip_serializing_if = "Option::is_none")]
        empty_state: Option<&'a EmptyStateResponse>,
        #[serde(skip_serializing_if = "Option::is_none")]
        load_more: Option<&'static str>,
    },
    Location {
        query: String,
    },
    Error {
        message: String,
    },
}

pub async fn ws_handler(
    State(state): State<AppState>,
    Extension(viewer): Extension<ViewerContext>,
    Path((provider, owner)): Path<(String, String)>,
    Query(query_state): Query<RepoListQueryState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let view = match resolve_view_context(&state, &viewer, &provider, &owner).await {
        Ok(view) => view,
        Err(err) => {
            tracing::error!("List session setup failed for {}/{}: {}", provider, owner, err);
            return err.into_response();
        }
    };

    ws.on_upgrade(move |socket| {
        handle_socket(socket, state.directory.clone(), provider, owner, query_state, view)
    })
}

/// Drives one live list session: the controller decides, this loop executes.
/// Page fetches run as detached tasks reporting back through the event
/// channel; once the socket closes the channel is gone and late results are
/// dropped on the floor.
async fn handle_socket(
    socket: WebSocket,
    directory: Arc<dyn RepoDirectory>,
    provider: String,
    owner: String,
    query_state: RepoListQueryState,
    view: ListViewContext,
) {
    let (mut sender, mut receiver) = socket.split();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<SessionEvent>();

    let mut controller = RepoListController::new(query_state);
    let mut debounce: Option<(u64, Pin<Box<tokio::time::Sleep>>)> = None;

    let commands = controller.initialize();
    if !run_commands(
        commands,
        &controller,
        &mut sender,
        &mut debounce,
        &event_tx,
        &directory,
        &provider,
        &owner,
        &view,
    )
    .await
    {
        return;
    }

    loop {
        let event = tokio::select! {
            incoming = receiver.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => match serde_json::from_str::<ClientMessage>(text.as_str()) {
                        Ok(message) => client_event(message),
                        Err(err) => {
                            tracing::warn!("Ignoring malformed list-session message: {}", err);
                            continue;
                        }
                    },
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => continue,
                    Some(Err(err)) => {
                        tracing::info!("List session socket error for {}/{}: {}", provider, owner, err);
                        break;
                    }
                }
            }
            Some(event) = event_rx.recv() => event,
            _ = wait_for_debounce(&mut debounce), if debounce.is_some() => {
                let token = debounce.take().map(|(token, _)| token).unwrap_or_default();
                SessionEvent::DebounceElapsed { token }
            }
        };

        let commands = controller.handle(event);
        if !run_commands(
            commands,
            &controller,
            &mut sender,
            &mut debounce,
            &event_tx,
            &directory,
            &provider,
            &owner,
            &view,
        )
        .await
        {
            break;
        }
    }
}

fn client_event(message: ClientMessage) -> SessionEvent {
    match message {
        ClientMessage::Search { term } => SessionEvent::SearchInput(term),
        ClientMessage::Sort { column } => SessionEvent::SortActivated(column),
        ClientMessage::Filter { value } => SessionEvent::FilterChanged(value),
        ClientMessage::LoadMore => SessionEvent::LoadMoreRequested,
    }
}

async fn wait_for_debounce(debounce: &mut Option<(u64, Pin<Box<tokio::time::Sleep>>)>) {
    match debounce {
        Some((_, sleep)) => sleep.as_mut().await,
        None => futures::future::pending().await,
    }
}

/// Executes controller commands. Returns false when the socket is gone.
#[allow(clippy::too_many_arguments)]
async fn run_commands(
    commands: Vec<SessionCommand>,
    controller: &RepoListController,
    sender: &mut SplitSink<WebSocket, Message>,
    debounce: &mut Option<(u64, Pin<Box<tokio::time::Sleep>>)>,
    event_tx: &mpsc::UnboundedSender<SessionEvent>,
    directory: &Arc<dyn RepoDirectory>,
    provider: &str,
    owner: &str,
    view: &ListViewContext,
) -> bool {
    for command in commands {
        match command {
            SessionCommand::ScheduleDebounce { token, delay } => {
                *debounce = Some((token, Box::pin(tokio::time::sleep(delay))));
            }

            SessionCommand::Fetch { generation, state } => {
                let directory = directory.clone();
                let event_tx = event_tx.clone();
                let provider = provider.to_string();
                let owner = owner.to_string();
                let view = view.clone();
                tokio::spawn(async move {
                    let event = match RepoListService::list(
                        directory.as_ref(),
                        &provider,
                        &owner,
                        &state,
                        &view,
                    )
                    .await
                    {
                        Ok(response) => SessionEvent::PageResolved {
                            generation,
                            response,
                        },
                        Err(err) => SessionEvent::PageFailed {
                            generation,
                            message: err.notification_message(),
                        },
                    };
                    // The session may already be gone; late results are not
                    // actionable anywhere else.
                    let _ = event_tx.send(event);
                });
            }

            SessionCommand::SyncLocation { query } => {
                let message = ServerMessage::Location { query };
                if !send_json(sender, &message).await {
                    return false;
                }
            }

            SessionCommand::Render => {
                let message = ServerMessage::Rows {
                    rows: controller.rows(),
                    empty_state: controller.empty_state(),
                    load_more: controller.load_more_visible().then_some(LOAD_MORE_LABEL),
                };
                if !send_json(sender, &message).await {
                    return false;
                }
            }

            SessionCommand::Notify { message } => {
                let message = ServerMessage::Error { message };
                if !send_json(sender, &message).await {
                    return false;
                }
            }
        }
    }

    true
}

async fn send_json(
    sender: &mut SplitSink<WebSocket, Message>,
    message: &ServerMessage<'_>,
) -> bool {
    let Ok(json) = serde_json::to_string(message) else {
        return true;
    };
    sender.send(Message::Text(json.into())).await.is_ok()
}
