//! Generic runtime for application orchestration.
//!
//! The Runtime drives the application event loop, coordinating between:
//! - [`App`]: booking form presenter
//! - [`Bridge`]: translation to the booking session
//! - [`Driver`]: Platform-specific I/O

use taxi_client::BookingSession;

use crate::{App, AppAction, AppEvent, Bridge, Driver};

/// Generic runtime that orchestrates App, Bridge, and Driver.
pub struct Runtime<D: Driver> {
    driver: D,
    app: App,
    bridge: Bridge,
}

impl<D: Driver> Runtime<D> {
    /// Create a runtime for `session` using `driver` for I/O.
    pub fn new(driver: D, session: BookingSession) -> Self {
        let bridge = Bridge::new(session);
        let app = App::new(bridge.snapshot());
        Self { driver, app, bridge }
    }

    /// Run the main event loop until the user quits.
    ///
    /// Starts the session (which subscribes to the rider topic), then loops:
    /// 1. Polls for input events from the driver
    /// 2. Feeds completed commands back into the session
    /// 3. Feeds push channel events into the session
    /// 4. Dispatches any commands the session queued
    ///
    /// On quit the session is ended, its unsubscribe dispatched, and the
    /// driver stopped. Commands still in flight are abandoned.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn run(mut self) -> Result<(), D::Error> {
        self.driver.render(&self.app)?;

        let events = self.bridge.start();
        self.dispatch_outgoing().await?;
        let mut quit = self.process_bridge_events(events).await?;

        while !quit {
            quit = self.process_cycle().await?;
        }

        let events = self.bridge.end();
        self.dispatch_outgoing().await?;
        for event in events {
            let _ = self.app.handle(event);
        }

        self.driver.stop();
        Ok(())
    }

    /// Process one cycle of the event loop.
    ///
    /// Returns `true` if the application should quit.
    async fn process_cycle(&mut self) -> Result<bool, D::Error> {
        let actions = self.driver.poll_event(&mut self.app).await?;
        if !actions.is_empty() && self.process_actions(actions).await? {
            return Ok(true);
        }

        while let Some(reply) = self.driver.recv_reply().await {
            let events = self.bridge.handle_reply(reply);
            self.dispatch_outgoing().await?;
            if self.process_bridge_events(events).await? {
                return Ok(true);
            }
        }

        while let Some(event) = self.driver.recv_push().await {
            let events = self.bridge.handle_channel(event);
            self.dispatch_outgoing().await?;
            if self.process_bridge_events(events).await? {
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Process actions returned by the App.
    ///
    /// Returns `true` if should quit.
    async fn process_actions(&mut self, initial_actions: Vec<AppAction>) -> Result<bool, D::Error> {
        let mut pending_actions = initial_actions;

        while !pending_actions.is_empty() {
            let actions = std::mem::take(&mut pending_actions);

            for action in actions {
                match action {
                    AppAction::Render => self.driver.render(&self.app)?,
                    AppAction::Quit => return Ok(true),

                    // Intents go through the bridge
                    AppAction::EditPickup { .. }
                    | AppAction::EditDropoff { .. }
                    | AppAction::Submit
                    | AppAction::Cancel => {
                        let events = self.bridge.process_app_action(action);
                        for event in events {
                            let new_actions = self.app.handle(event);
                            pending_actions.extend(new_actions);
                        }
                        self.dispatch_outgoing().await?;
                    },
                }
            }
        }
        Ok(false)
    }

    /// Process events from Bridge back to App.
    async fn process_bridge_events(&mut self, events: Vec<AppEvent>) -> Result<bool, D::Error> {
        for event in events {
            let actions = self.app.handle(event);
            if self.process_actions(actions).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Hand all queued commands to the driver.
    async fn dispatch_outgoing(&mut self) -> Result<(), D::Error> {
        for command in self.bridge.take_outgoing() {
            self.driver.dispatch(command).await?;
        }
        Ok(())
    }

    /// Get a reference to the App
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Get a mutable reference to the App
    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }

    /// Get a reference to the Bridge
    pub fn bridge(&self) -> &Bridge {
        &self.bridge
    }
}
