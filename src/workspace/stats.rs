use super::{Workspace, WorkspaceState};
use crate::error::Result;
use crate::types::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UserMetric {
    ChannelsJoined,
    DmsJoined,
    MessagesSent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WorkspaceMetric {
    ChannelsExist,
    DmsExist,
    MessagesExist,
}

fn latest(series: &[StatPoint]) -> i64 {
    series.last().map_or(0, |p| p.count)
}

fn append(series: &mut Vec<StatPoint>, delta: i64, now: i64) {
    let count = (latest(series) + delta).max(0);
    series.push(StatPoint {
        count,
        time_stamp: now,
    });
}

impl UserStats {
    /// Every series starts with a zero entry at registration time.
    pub(crate) fn starting_at(now: i64) -> Self {
        let zero = vec![StatPoint {
            count: 0,
            time_stamp: now,
        }];
        Self {
            channels_joined: zero.clone(),
            dms_joined: zero.clone(),
            messages_sent: zero,
        }
    }

    fn involvement_numerator(&self) -> i64 {
        latest(&self.channels_joined) + latest(&self.dms_joined) + latest(&self.messages_sent)
    }

    fn is_involved(&self) -> bool {
        latest(&self.channels_joined) > 0 || latest(&self.dms_joined) > 0
    }
}

impl WorkspaceStats {
    fn total(&self) -> i64 {
        latest(&self.channels_exist) + latest(&self.dms_exist) + latest(&self.messages_exist)
    }
}

impl WorkspaceState {
    pub(crate) fn record_user(&mut self, user: UserId, metric: UserMetric, delta: i64, now: i64) {
        let Some(user) = self.users.get_mut(&user) else {
            return;
        };
        let series = match metric {
            UserMetric::ChannelsJoined => &mut user.stats.channels_joined,
            UserMetric::DmsJoined => &mut user.stats.dms_joined,
            UserMetric::MessagesSent => &mut user.stats.messages_sent,
        };
        append(series, delta, now);
    }

    pub(crate) fn record_workspace(&mut self, metric: WorkspaceMetric, delta: i64, now: i64) {
        let stats = &mut self.workspace_stats;
        let series = match metric {
            WorkspaceMetric::ChannelsExist => &mut stats.channels_exist,
            WorkspaceMetric::DmsExist => &mut stats.dms_exist,
            WorkspaceMetric::MessagesExist => &mut stats.messages_exist,
        };
        append(series, delta, now);
    }

    /// Seeds the workspace series with zero entries if they have never been written.
    pub(crate) fn ensure_workspace_series(&mut self, now: i64) {
        if self.workspace_stats == WorkspaceStats::default() {
            self.workspace_stats = WorkspaceStats {
                channels_exist: vec![StatPoint {
                    count: 0,
                    time_stamp: now,
                }],
                dms_exist: vec![StatPoint {
                    count: 0,
                    time_stamp: now,
                }],
                messages_exist: vec![StatPoint {
                    count: 0,
                    time_stamp: now,
                }],
            };
        }
    }

    pub(crate) fn involvement_rate(&self, user: &User) -> f64 {
        let denominator = self.workspace_stats.total();
        if denominator == 0 {
            return 0.0;
        }
        let rate = user.stats.involvement_numerator() as f64 / denominator as f64;
        rate.clamp(0.0, 1.0)
    }

    pub(crate) fn utilization_rate(&self) -> f64 {
        let (total, involved) = self
            .live_users()
            .fold((0usize, 0usize), |(total, involved), u| {
                (total + 1, involved + usize::from(u.stats.is_involved()))
            });
        if total == 0 {
            return 0.0;
        }
        involved as f64 / total as f64
    }
}

impl Workspace {
    /// The caller's own statistics series plus their involvement rate.
    pub fn user_stats(&self, caller: UserId) -> Result<UserStatsReport> {
        let state = self.lock();
        let user = state.require_actor(caller)?;

        Ok(UserStatsReport {
            channels_joined: user.stats.channels_joined.clone(),
            dms_joined: user.stats.dms_joined.clone(),
            messages_sent: user.stats.messages_sent.clone(),
            involvement_rate: state.involvement_rate(user),
        })
    }

    pub fn workspace_stats(&self, caller: UserId) -> Result<WorkspaceStatsReport> {
        let state = self.lock();
        state.require_actor(caller)?;

        let stats = &state.workspace_stats;
        Ok(WorkspaceStatsReport {
            channels_exist: stats.channels_exist.clone(),
            dms_exist: stats.dms_exist.clone(),
            messages_exist: stats.messages_exist.clone(),
            utilization_rate: state.utilization_rate(),
        })
    }
}
