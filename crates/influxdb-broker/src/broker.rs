// Copyright 2024-Present influxdb-broker contributors
// SPDX-License-Identifier: Apache-2.0

//! Event dispatch: one incoming check event in, zero or more buffered
//! points out.

use std::sync::Arc;

use crate::buffer::PointBuffer;
use crate::builder;
use crate::event::{
    CheckEvent, HostResult, ServiceResult, StateKind, UnknownHostResult, UnknownServiceResult,
};
use crate::naming;
use crate::point::Point;

pub struct InfluxBroker {
    buffer: Arc<PointBuffer>,
}

impl InfluxBroker {
    pub fn new(buffer: Arc<PointBuffer>) -> Self {
        Self { buffer }
    }

    /// Converts the event into points and queues them for the next flush.
    pub fn handle(&self, event: &CheckEvent) {
        let points = match event {
            CheckEvent::ServiceResult(result) => Self::service_result_points(result),
            CheckEvent::HostResult(result) => Self::host_result_points(result),
            CheckEvent::UnknownServiceResult(result) => {
                Self::unknown_service_result_points(result)
            }
            CheckEvent::UnknownHostResult(result) => Self::unknown_host_result_points(result),
            CheckEvent::LogNotification(notification) => {
                builder::log_event_points(&notification.log)
            }
        };
        self.buffer.append(points);
    }

    fn service_result_points(result: &ServiceResult) -> Vec<Point> {
        let prefix = naming::service_context(&result.host_name, &result.service_description);
        let status = result.status();
        let mut points = builder::perfdata_points(&result.perf_data, result.last_chk, &prefix);
        points.extend(builder::state_transition_points(&status, &prefix));
        points.extend(builder::current_state_points(
            &status,
            &prefix,
            StateKind::Service,
        ));
        points
    }

    fn host_result_points(result: &HostResult) -> Vec<Point> {
        let prefix = naming::host_context(&result.host_name);
        let status = result.status();
        let mut points = builder::perfdata_points(&result.perf_data, result.last_chk, &prefix);
        points.extend(builder::state_transition_points(&status, &prefix));
        points.extend(builder::current_state_points(
            &status,
            &prefix,
            StateKind::Host,
        ));
        points
    }

    // Passive results for unknown hosts and services carry no state
    // machinery, so only their perfdata becomes points.
    fn unknown_service_result_points(result: &UnknownServiceResult) -> Vec<Point> {
        let prefix = naming::service_context(&result.host_name, &result.service_description);
        builder::perfdata_points(&result.perf_data, result.time_stamp, &prefix)
    }

    fn unknown_host_result_points(result: &UnknownHostResult) -> Vec<Point> {
        let prefix = naming::host_context(&result.host_name);
        builder::perfdata_points(&result.perf_data, result.time_stamp, &prefix)
    }
}
