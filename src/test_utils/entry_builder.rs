use crate::Command;
use crate::HealthCheck;
use crate::Index;
use crate::LogEntry;
use crate::Node;
use crate::NodeService;

/// Hands out log entries with consecutive indexes
pub struct EntryBuilder {
    index: Index,
}

impl EntryBuilder {
    pub fn new(start_index: Index) -> Self {
        Self { index: start_index }
    }

    pub fn next(
        &mut self,
        command: Command,
    ) -> LogEntry {
        let entry = LogEntry::new(self.index, command);
        self.index += 1;
        entry
    }

    pub fn node(
        &mut self,
        node: Node,
    ) -> LogEntry {
        self.next(Command::RegisterNode(node))
    }

    pub fn service(
        &mut self,
        node: &str,
        service: NodeService,
    ) -> LogEntry {
        self.next(Command::RegisterService {
            node: node.to_string(),
            service,
        })
    }

    pub fn check(
        &mut self,
        check: HealthCheck,
    ) -> LogEntry {
        self.next(Command::RegisterCheck(check))
    }

    pub fn peek_index(&self) -> Index {
        self.index
    }
}
