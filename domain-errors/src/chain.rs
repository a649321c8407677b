use std::error::Error as StdError;

use crate::code::Code;
use crate::err::Err;
use crate::sentinel::Sentinel;

/// Итератор по цепочке причин: сама ошибка, затем `source()` до конца.
#[derive(Debug, Clone)]
pub struct Chain<'a> {
    next: Option<&'a (dyn StdError + 'static)>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a (dyn StdError + 'static);

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.source();
        Some(current)
    }
}

/// Обходит ошибку и все её причины.
pub fn chain<'a>(err: &'a (dyn StdError + 'static)) -> Chain<'a> {
    Chain { next: Some(err) }
}

/// Первая ошибка в цепочке с типом `T`.
pub fn find<'a, T: StdError + 'static>(err: &'a (dyn StdError + 'static)) -> Option<&'a T> {
    chain(err).find_map(|err| err.downcast_ref::<T>())
}

/// Есть ли в цепочке указанная базовая ошибка.
pub fn is_sentinel(err: &(dyn StdError + 'static), sentinel: Sentinel) -> bool {
    chain(err).any(|err| err.downcast_ref::<Sentinel>() == Some(&sentinel))
}

/// Код первой [`Err`] в цепочке.
pub fn code_of(err: &(dyn StdError + 'static)) -> Option<Code> {
    find::<Err>(err).map(Err::code)
}
