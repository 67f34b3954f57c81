use crate::api::ApiError;
use crate::app::use_router;
use crate::components::ui::{
    Alert, AlertDescription, AlertVariant, Button, ButtonSize, Card, CardContent,
    CardDescription, CardHeader, CardTitle, Checkbox, Input, Label, Spinner,
};
use crate::components::Toaster;
use crate::models::Schedule;
use crate::selection::Notifier;
use crate::state::AppContext;
use chrono::NaiveTime;
use leptos::prelude::*;
use leptos::task::spawn_local;

const DAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub(crate) enum ScheduleFormError {
    #[error("`{0}` is not a valid time, use HH:MM")]
    InvalidTime(String),
    #[error("Pick at least one day")]
    NoDays,
    #[error("Add at least one posting time")]
    NoTimes,
}

/// Parse a comma or whitespace separated list of `HH:MM` times.
///
/// Output is normalised to two-digit hours, sorted and deduplicated.
pub(crate) fn parse_times(raw: &str) -> Result<Vec<String>, ScheduleFormError> {
    let mut times = raw
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .map(|t| {
            NaiveTime::parse_from_str(t, "%H:%M")
                .map(|time| time.format("%H:%M").to_string())
                .map_err(|_| ScheduleFormError::InvalidTime(t.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    times.sort();
    times.dedup();
    Ok(times)
}

/// Assemble a schedule from the form fields.
pub(crate) fn build_schedule(
    days: &[bool; 7],
    times: &str,
    timezone: &str,
    is_active: bool,
) -> Result<Schedule, ScheduleFormError> {
    let days_of_week: Vec<u8> = (0u8..7).filter(|d| days[usize::from(*d)]).collect();
    let times = parse_times(times)?;

    // An inactive schedule may be left incomplete.
    if is_active {
        if days_of_week.is_empty() {
            return Err(ScheduleFormError::NoDays);
        }
        if times.is_empty() {
            return Err(ScheduleFormError::NoTimes);
        }
    }

    Ok(Schedule {
        days_of_week,
        times,
        timezone: timezone.trim().to_string(),
        is_active,
    })
}

#[component]
pub fn SchedulePage(schedule: Schedule) -> impl IntoView {
    let AppContext(app) = expect_context::<AppContext>();
    let router = use_router();
    let toaster = expect_context::<Toaster>();

    let mut initial_days = [false; 7];
    for d in &schedule.days_of_week {
        if let Some(slot) = initial_days.get_mut(usize::from(*d)) {
            *slot = true;
        }
    }
    let days = RwSignal::new(initial_days);
    let times = RwSignal::new(schedule.times.join(", "));
    let timezone = RwSignal::new(schedule.timezone.clone());
    let active = RwSignal::new(schedule.is_active);
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let saving = RwSignal::new(false);

    let scope = app.nav.page_scope();
    let mark_dirty = {
        let scope = scope.clone();
        Callback::new(move |_: ()| {
            scope.set_unsaved_changes(true);
        })
    };

    let on_save = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if saving.get_untracked() {
            return;
        }
        let updated = match build_schedule(
            &days.get_untracked(),
            &times.get_untracked(),
            &timezone.get_untracked(),
            active.get_untracked(),
        ) {
            Ok(s) => s,
            Err(e) => {
                error.set(Some(e.to_string()));
                return;
            }
        };

        let api = app.api_client.get_untracked();
        let scope = scope.clone();
        let router = router.clone();
        error.set(None);
        saving.set(true);
        spawn_local(async move {
            match api.update_schedule(&updated).await {
                Ok(saved) => {
                    tracing::info!(days = saved.days_of_week.len(), times = saved.times.len(), "schedule saved");
                    times.set(saved.times.join(", "));
                    scope.set_unsaved_changes(false);
                    toaster.success("Schedule saved".to_string());
                }
                Err(ApiError::Unauthorized) => router.expire_session(),
                Err(e) => error.set(Some(e.to_string())),
            }
            saving.set(false);
        });
    };

    let day_toggles = DAY_LABELS
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let checked = Signal::derive(move || days.with(|d| d[i]));
            let on_toggle = Callback::new(move |on: bool| {
                days.update(|d| d[i] = on);
                mark_dirty.run(());
            });
            view! {
                <Label class="text-xs">
                    <Checkbox checked=checked label=*label on_toggle=on_toggle />
                    {*label}
                </Label>
            }
        })
        .collect_view();

    view! {
        <Card>
            <CardHeader>
                <CardTitle>"Posting schedule"</CardTitle>
                <CardDescription>"New posts are slotted into these days and times."</CardDescription>
            </CardHeader>
            <CardContent>
                <form class="flex flex-col gap-4" on:submit=on_save>
                    <Label class="text-sm">
                        <Checkbox
                            checked=active
                            label="Schedule active"
                            on_toggle=Callback::new(move |on: bool| {
                                active.set(on);
                                mark_dirty.run(());
                            })
                        />
                        "Active"
                    </Label>
                    <div class="flex flex-wrap gap-4">{day_toggles}</div>
                    <div class="flex flex-col gap-1.5">
                        <Label html_for="times">"Times"</Label>
                        <Input id="times" placeholder="09:00, 18:30" bind_value=times on_edit=mark_dirty />
                    </div>
                    <div class="flex flex-col gap-1.5">
                        <Label html_for="timezone">"Timezone"</Label>
                        <Input id="timezone" placeholder="Europe/Berlin" bind_value=timezone on_edit=mark_dirty />
                    </div>
                    {move || {
                        error.get().map(|e| {
                            view! {
                                <Alert variant=AlertVariant::Destructive>
                                    <AlertDescription>{e}</AlertDescription>
                                </Alert>
                            }
                        })
                    }}
                    <div>
                        <Button size=ButtonSize::Sm attr:disabled=move || saving.get()>
                            <Show when=move || saving.get() fallback=|| ()>
                                <Spinner />
                            </Show>
                            "Save schedule"
                        </Button>
                    </div>
                </form>
            </CardContent>
        </Card>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_times_normalises_and_sorts() {
        assert_eq!(
            parse_times("18:30, 9:00 09:00,,"),
            Ok(vec!["09:00".to_string(), "18:30".to_string()])
        );
        assert_eq!(parse_times(""), Ok(vec![]));
        assert_eq!(
            parse_times("9am"),
            Err(ScheduleFormError::InvalidTime("9am".to_string()))
        );
    }

    #[test]
    fn test_build_schedule() {
        let mut days = [false; 7];
        days[0] = true;
        days[4] = true;

        let s = build_schedule(&days, "10:00", " UTC ", true).expect("valid");
        assert_eq!(s.days_of_week, vec![0, 4]);
        assert_eq!(s.timezone, "UTC");

        assert_eq!(
            build_schedule(&[false; 7], "10:00", "UTC", true),
            Err(ScheduleFormError::NoDays)
        );
        assert_eq!(
            build_schedule(&days, " ", "UTC", true),
            Err(ScheduleFormError::NoTimes)
        );
        assert!(build_schedule(&[false; 7], "", "UTC", false).is_ok());
    }
}
