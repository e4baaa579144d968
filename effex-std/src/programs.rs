//! Ready-made effectful programs.

use effex::{effectful, perform, Chain, Run};

use crate::bundles::{Console, Lenient, Scripted};
use crate::effects::{Attempt, Print, Read};

/// Topping lookup used by [`pizza`]; the shop is always out of stock.
fn pick_topping() -> Result<String, String> {
    Err("out of toppings".to_string())
}

/// Greet, echo one line, fail to pick a topping, then print the topping
/// with " pizza" appended and return `19`.
///
/// Under [`Scripted`] or [`Console`] the failed pick suspends; resuming
/// with `"pineapple on"` prints `pineapple on pizza`.
pub fn pizza() -> impl Chain<Output = u32> + Run<Console> + Run<Scripted> + Run<Lenient> {
    effectful! {
        perform!(Print("init".to_string()));
        let line = perform!(Read);
        perform!(Print(line));
        let topping = perform!(Attempt(pick_topping()));
        perform!(Print(format!("{topping} pizza")));
        19
    }
}
