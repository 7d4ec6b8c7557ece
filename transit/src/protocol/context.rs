/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

use crate::common::MobilityError;
use crate::message::MessageAddress;
use crate::ticket::MoveTicket;
use crate::traits::MobilitySupport;

/// The read-only facts a handler checks its ticket against.
#[derive(Debug, Clone)]
pub(crate) struct HandlerContext {
    pub(crate) agent: MessageAddress,
    pub(crate) node: MessageAddress,
    pub(crate) ticket: MoveTicket,
}

impl HandlerContext {
    pub(crate) fn from_support(support: &dyn MobilitySupport) -> Self {
        Self {
            agent: support.agent().clone(),
            node: support.node().clone(),
            ticket: support.ticket().clone(),
        }
    }

    /// The ticket's agent, if stated, must be the agent being handled.
    pub(crate) fn check_agent(&self) -> Result<(), MobilityError> {
        match self.ticket.mobile_agent() {
            Some(agent) if *agent != self.agent => Err(MobilityError::TicketMismatch(format!(
                "move agent {} doesn't match ticket agent {}",
                self.agent, agent
            ))),
            _ => Ok(()),
        }
    }

    /// The ticket's origin, if stated, must be this node.
    pub(crate) fn check_origin(&self) -> Result<(), MobilityError> {
        match self.ticket.origin_node() {
            Some(origin) if *origin != self.node => Err(MobilityError::TicketMismatch(format!(
                "current node {} doesn't match ticket origin node {}",
                self.node, origin
            ))),
            _ => Ok(()),
        }
    }

    /// The agent stays on this node.
    pub(crate) fn check_local_destination(&self) -> Result<(), MobilityError> {
        match self.ticket.destination_node() {
            Some(dest) if *dest != self.node => Err(MobilityError::TicketMismatch(format!(
                "current node {} doesn't match ticket destination node {}",
                self.node, dest
            ))),
            _ => Ok(()),
        }
    }

    /// The agent leaves this node for another.
    pub(crate) fn check_remote_destination(&self) -> Result<(), MobilityError> {
        match self.ticket.destination_node() {
            Some(dest) if *dest != self.node => Ok(()),
            Some(dest) => Err(MobilityError::TicketMismatch(format!(
                "destination node {} is the current node",
                dest
            ))),
            None => Err(MobilityError::TicketMismatch(
                "remote move without a destination node".to_string(),
            )),
        }
    }

    pub(crate) fn check_restart(&self, expected: bool) -> Result<(), MobilityError> {
        if self.ticket.is_force_restart() == expected {
            Ok(())
        } else if expected {
            Err(MobilityError::TicketMismatch(
                "test dispatch requires a forced restart".to_string(),
            ))
        } else {
            Err(MobilityError::TicketMismatch(
                "forced restart cannot be handled without a restart cycle".to_string(),
            ))
        }
    }

    /// Checks shared by every dispatch: agent and origin.
    pub(crate) fn check_dispatch(&self) -> Result<(), MobilityError> {
        self.check_agent()?;
        self.check_origin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(ticket: MoveTicket) -> HandlerContext {
        HandlerContext {
            agent: MessageAddress::new("a1"),
            node: MessageAddress::new("n2"),
            ticket,
        }
    }

    #[test]
    fn test_foreign_origin_is_a_mismatch() {
        let ticket = MoveTicket::builder().agent("a1").origin("n1").destination("n3").build().unwrap();
        assert!(matches!(
            context(ticket).check_dispatch(),
            Err(MobilityError::TicketMismatch(_))
        ));
    }

    #[test]
    fn test_other_agent_is_a_mismatch() {
        let ticket = MoveTicket::builder().agent("a9").destination("n3").build().unwrap();
        assert!(context(ticket).check_agent().is_err());
    }

    #[test]
    fn test_unstated_fields_are_not_checked() {
        let ticket = MoveTicket::builder().force_restart(true).build().unwrap();
        let context = context(ticket);
        assert!(context.check_dispatch().is_ok());
        assert!(context.check_local_destination().is_ok());
        assert!(context.check_remote_destination().is_err());
    }
}
