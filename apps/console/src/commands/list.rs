//! `list <screen>`: one screen mount, from fetch to printed page.
//!
//! ```text
//! FetchStarted ─► References(table) ─► Loaded | FetchFailed
//!              ─► PageSize ─► Search ─► SetFilter… ─► SetRange ─► SetDateRange
//!              ─► Sort ─► GoToPage ─► render
//! ```

use chrono::Utc;
use optica_api::{ApiClient, ConsoleConfig, Endpoint};
use optica_core::types::{Branch, Client, Employee, Prescription, Product, Sale};
use optica_core::promotion::Promotion;
use optica_core::{ScreenAction, ScreenKind, ScreenState, SortKey};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use crate::error::ConsoleResult;
use crate::render::{self, Tabular};
use crate::ListArgs;

pub async fn run(api: &ApiClient, config: &ConsoleConfig, args: &ListArgs, json: bool) -> ConsoleResult<String> {
    match args.screen {
        ScreenKind::Products(_) => list::<Product>(api, config, args, json).await,
        ScreenKind::Clients => list::<Client>(api, config, args, json).await,
        ScreenKind::Employees => list::<Employee>(api, config, args, json).await,
        ScreenKind::Branches => list::<Branch>(api, config, args, json).await,
        ScreenKind::Prescriptions => list::<Prescription>(api, config, args, json).await,
        ScreenKind::Sales => list::<Sale>(api, config, args, json).await,
        ScreenKind::Promotions => list::<Promotion>(api, config, args, json).await,
    }
}

async fn list<T>(api: &ApiClient, config: &ConsoleConfig, args: &ListArgs, json: bool) -> ConsoleResult<String>
where
    T: Tabular + DeserializeOwned + Serialize,
{
    let screen = args.screen;
    let mut state = ScreenState::<T>::new(config.screen_settings(), Utc::now());

    state.dispatch(ScreenAction::FetchStarted)?;
    let references = api.fetch_references(screen.references()).await;
    state.dispatch(ScreenAction::References(references))?;

    match api.fetch_list::<T>(Endpoint::for_screen(screen)).await {
        Ok(records) => state.dispatch(ScreenAction::Loaded {
            records,
            at: Utc::now(),
        })?,
        Err(err) => {
            state.dispatch(ScreenAction::FetchFailed {
                message: err.notification_message(),
                at: Utc::now(),
            })?;
            return Err(err.into());
        }
    }

    apply(&mut state, args)?;
    info!(screen = %screen, shown = state.page().len(), total = state.rows().len(), "listing ready");

    if json {
        render::page_json(&state)
    } else {
        Ok(render::page(&state))
    }
}

/// Replays the command-line options as screen actions.
///
/// Page size goes first and the page last, since search and filter
/// changes return to the first page.
pub fn apply<T: Tabular>(state: &mut ScreenState<T>, args: &ListArgs) -> ConsoleResult<()> {
    if let Some(size) = args.page_size {
        state.dispatch(ScreenAction::PageSize(size))?;
    }
    if let Some(term) = &args.search {
        state.dispatch(ScreenAction::Search(term.clone()))?;
    }
    for (key, value) in &args.filters {
        state.dispatch(ScreenAction::SetFilter {
            key: key.clone(),
            value: value.clone(),
        })?;
    }
    if args.min.is_some() || args.max.is_some() {
        state.dispatch(ScreenAction::SetRange {
            min: args.min,
            max: args.max,
        })?;
    }
    if args.from.is_some() || args.to.is_some() {
        state.dispatch(ScreenAction::SetDateRange {
            from: args.from,
            to: args.to,
        })?;
    }
    if let Some(raw) = &args.sort {
        state.dispatch(ScreenAction::Sort(SortKey::parse(raw)?))?;
    }
    if let Some(page) = args.page {
        state.dispatch(ScreenAction::GoToPage(page.saturating_sub(1)))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::{Cli, Command};
    use chrono::{DateTime, TimeZone};
    use clap::Parser;
    use optica_core::ScreenSettings;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn args(extra: &[&str]) -> ListArgs {
        let mut argv = vec!["optica-console", "list", "clientes"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Command::List(args) => args,
            other => panic!("unexpected {:?}", other),
        }
    }

    fn loaded() -> ScreenState<Client> {
        let records: Vec<Client> = (1..=25)
            .map(|i| {
                serde_json::from_value(json!({
                    "_id": format!("c{i}"),
                    "nombre": format!("Cliente{i:02}"),
                    "edad": i + 20,
                    "estado": if i % 5 == 0 { "inactivo" } else { "activo" },
                    "fechaRegistro": format!("2024-01-{i:02}"),
                }))
                .unwrap()
            })
            .collect();
        let mut state = ScreenState::new(ScreenSettings::default(), now());
        state.dispatch(ScreenAction::Loaded { records, at: now() }).unwrap();
        state
    }

    fn names(state: &ScreenState<Client>) -> Vec<String> {
        state.page().iter().map(|row| row.record.nombre.clone()).collect()
    }

    #[test]
    fn test_filter_range_and_sort() {
        let mut state = loaded();
        apply(
            &mut state,
            &args(&["-f", "estado=activo", "--min", "30", "--sort", "edad:desc"]),
        )
        .unwrap();

        // edad 30..=45 are clients 10..=25; the inactive ones are multiples of 5.
        assert_eq!(state.rows().len(), 12);
        assert_eq!(names(&state)[0], "Cliente24");
    }

    #[test]
    fn test_page_is_one_based_and_applied_last() {
        let mut state = loaded();
        apply(&mut state, &args(&["--page", "3", "--page-size", "10", "--search", "cliente"])).unwrap();
        assert_eq!(state.paginator().index(), 2);
        assert_eq!(names(&state), vec!["Cliente21", "Cliente22", "Cliente23", "Cliente24", "Cliente25"]);
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let mut state = loaded();
        apply(&mut state, &args(&["--from", "2024-01-03", "--to", "2024-01-05"])).unwrap();
        assert_eq!(state.rows().len(), 3);
    }

    #[test]
    fn test_invalid_options_are_validation_errors() {
        let mut state = loaded();
        let err = apply(&mut state, &args(&["--sort", "salario"])).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = apply(&mut state, &args(&["--page-size", "0"])).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = apply(&mut state, &args(&["--page-size", "101"])).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(state.paginator().size(), 10);
    }
}
