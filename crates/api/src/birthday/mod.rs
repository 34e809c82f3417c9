mod send_birthday_greetings;

pub use send_birthday_greetings::SendBirthdayGreetingsUseCase;
