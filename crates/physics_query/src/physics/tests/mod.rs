//! Facade tests against real parry3d worlds

mod support;
mod scenarios;
