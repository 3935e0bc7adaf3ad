use alloc::{vec, vec::Vec};
use std::thread;

use crossbeam_channel::{bounded, unbounded};

use crate::{
  core::{
    Value, ValueStream, escape, filter, map, take,
    testing::{even, inc, int_values},
  },
  std::{ChannelSender, feed_channel},
};

use super::go;

#[test]
fn go_runs_the_pipeline_on_a_worker_and_closes_the_output() {
  let (sender, input) = unbounded();
  let output = go(input, 5, &[map(inc), filter(even)]);
  thread::spawn(move || feed_channel(ValueStream::range(5), sender));
  assert_eq!(output.iter().collect::<Vec<_>>(), int_values(&[2, 4]));
}

#[test]
fn go_supports_synchronous_handoff_with_zero_capacity() {
  let (sender, input) = bounded(0);
  let output = go(input, 0, &[map(inc)]);
  thread::spawn(move || feed_channel(ValueStream::range(3), sender));
  assert_eq!(output.iter().collect::<Vec<_>>(), int_values(&[1, 2, 3]));
}

#[test]
fn go_stops_on_early_termination_and_still_closes_the_output() {
  let (sender, input) = unbounded();
  let output = go(input, 0, &[take(2)]);
  thread::spawn(move || feed_channel(ValueStream::range(100), sender));
  assert_eq!(output.iter().collect::<Vec<_>>(), int_values(&[0, 1]));
}

#[test]
fn escape_branches_one_pipeline_into_another() {
  let (diverted_sender, diverted) = bounded(0);
  let (sender, input) = bounded(0);

  let main_stack = vec![escape(even, ChannelSender::new(diverted_sender), true)];
  let secondary_stack = vec![map(inc), map(inc), map(inc)];

  let main_output = go(input, 5, &main_stack);
  let secondary_output = go(diverted, 5, &secondary_stack);
  thread::spawn(move || feed_channel(ValueStream::range(5), sender));

  assert_eq!(main_output.iter().collect::<Vec<_>>(), int_values(&[1, 3]));
  assert_eq!(secondary_output.iter().collect::<Vec<_>>(), int_values(&[3, 5, 7]));
}
