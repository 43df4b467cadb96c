mod thread;
mod message;
mod records;
mod checkin;

pub use thread::MongoThreadRepository;
pub use message::MongoMessageRepository;
pub use records::MongoRecordRepository;
pub use checkin::MongoCheckinRepository;
