//! Built-in reference content: offline docs, practice quiz, interview notes.
//! Inert data; the app stays useful with no config and no network.

use crate::domain::{DocItem, InterviewTopic, Language, QuizQuestion, TopicCategory};

fn doc(id: &str, language: Language, title: &str, category: &str, keywords: &[&str], content: &str) -> DocItem {
  DocItem {
    id: id.into(),
    language,
    title: title.into(),
    category: category.into(),
    content: content.trim().to_string(),
    keywords: keywords.iter().map(|k| k.to_string()).collect(),
  }
}

pub fn offline_docs() -> Vec<DocItem> {
  vec![
    doc(
      "py-list-comp",
      Language::Python,
      "List Comprehension",
      "Data Structures",
      &["list", "comprehension", "loop", "python"],
      r#"
# List Comprehension in Python

List comprehension offers a shorter syntax when you want to create a new list based on the values of an existing list.

**Syntax:**
`newlist = [expression for item in iterable if condition == True]`

**Example:**
```python
fruits = ["apple", "banana", "cherry", "kiwi", "mango"]
newlist = [x for x in fruits if "a" in x]
print(newlist)
# Output: ['apple', 'banana', 'mango']
```
"#,
    ),
    doc(
      "py-dict-methods",
      Language::Python,
      "Dictionary Methods",
      "Data Structures",
      &["dict", "map", "key", "value", "get", "items"],
      r#"
# Python Dictionary Methods

- **get(key, default)**: Returns the value of the specified key. If the key does not exist: returns default value.
- **keys()**: Returns a list containing the dictionary's keys.
- **values()**: Returns a list of all the values in the dictionary.
- **items()**: Returns a list containing a tuple for each key value pair.

**Example:**
```python
car = {"brand": "Ford", "model": "Mustang"}
x = car.get("model")
print(x) # Mustang
```
"#,
    ),
    doc(
      "js-array-map",
      Language::Javascript,
      "Array.prototype.map()",
      "Array Methods",
      &["array", "map", "loop", "javascript", "es6"],
      r#"
# Array.prototype.map()

The **map()** method creates a new array populated with the results of calling a provided function on every element in the calling array.

**Syntax:**
`const newArray = array.map(callbackFn)`

**Example:**
```javascript
const array1 = [1, 4, 9, 16];
const map1 = array1.map(x => x * 2);
console.log(map1);
// Expected output: Array [2, 8, 18, 32]
```
"#,
    ),
    doc(
      "js-async-await",
      Language::Javascript,
      "Async / Await",
      "Asynchronous",
      &["async", "await", "promise", "fetch"],
      r#"
# Async / Await

**async** and **await** make promises easier to write.

- **async** makes a function return a Promise.
- **await** makes a function wait for a Promise.

**Example:**
```javascript
async function myDisplay() {
  let myPromise = new Promise(function(resolve) {
    setTimeout(function() {resolve("I love You !!");}, 3000);
  });
  let result = await myPromise;
  console.log(result);
}

myDisplay();
```
"#,
    ),
    doc(
      "c-pointers",
      Language::C,
      "Pointers in C",
      "Memory Management",
      &["pointer", "memory", "address", "c"],
      r#"
# Pointers in C

A pointer is a variable that stores the memory address of another variable.

**Syntax:**
`type *var-name;`

**Example:**
```c
int myAge = 43;     // An int variable
int* ptr = &myAge;  // A pointer variable, with the name ptr, that stores the address of myAge

printf("%d\n", myAge);  // Outputs the value of myAge (43)
printf("%p\n", ptr);    // Outputs the memory address of myAge
printf("%d\n", *ptr);   // Outputs the value of myAge with the pointer (43)
```
"#,
    ),
    doc(
      "cpp-vectors",
      Language::Cpp,
      "std::vector",
      "STL",
      &["vector", "array", "stl", "cpp"],
      r#"
# std::vector in C++

Vectors are sequence containers representing arrays that can change in size.

**Key Functions:**
- **push_back()**: Adds element to the end.
- **pop_back()**: Removes the last element.
- **size()**: Returns the number of elements.

**Example:**
```cpp
#include <iostream>
#include <vector>

int main() {
  std::vector<int> v = {1, 2, 3};
  v.push_back(4);

  for(int i : v) {
    std::cout << i << " ";
  }
  return 0;
}
```
"#,
    ),
    doc(
      "java-arraylist",
      Language::Java,
      "ArrayList",
      "Collections",
      &["list", "array", "collection", "java"],
      r#"
# Java ArrayList

The ArrayList class is a resizable array, which can be found in the `java.util` package.

**Example:**
```java
import java.util.ArrayList;

public class Main {
  public static void main(String[] args) {
    ArrayList<String> cars = new ArrayList<String>();
    cars.add("Volvo");
    cars.add("BMW");
    cars.add("Ford");
    System.out.println(cars);
  }
}
```
"#,
    ),
  ]
}

/// Case-insensitive match on title or any keyword. Empty term returns everything.
pub fn search_docs<'a>(docs: &'a [DocItem], term: &str) -> Vec<&'a DocItem> {
  let needle = term.trim().to_lowercase();
  if needle.is_empty() {
    return docs.iter().collect();
  }
  docs
    .iter()
    .filter(|d| d.title.to_lowercase().contains(&needle) || d.keywords.iter().any(|k| k.to_lowercase().contains(&needle)))
    .collect()
}

fn question(id: &str, language: Language, text: &str, options: &[&str], correct_index: usize, explanation: &str) -> QuizQuestion {
  QuizQuestion {
    id: id.into(),
    language,
    question: text.into(),
    options: options.iter().map(|o| o.to_string()).collect(),
    correct_index,
    explanation: explanation.into(),
  }
}

pub fn practice_quiz() -> Vec<QuizQuestion> {
  vec![
    question(
      "q1",
      Language::Python,
      "What is the output of `print(2 ** 3)` in Python?",
      &["6", "8", "9", "Error"],
      1,
      "** is the exponentiation operator in Python. 2 raised to the power of 3 is 8.",
    ),
    question(
      "q2",
      Language::Javascript,
      "Which keyword is used to declare a block-scoped variable in JavaScript?",
      &["var", "let", "block", "int"],
      1,
      "`let` and `const` are block-scoped. `var` is function-scoped.",
    ),
    question(
      "q3",
      Language::Python,
      "Which data type is mutable in Python?",
      &["Tuple", "String", "List", "Integer"],
      2,
      "Lists are mutable (can be changed). Tuples, Strings, and Integers are immutable.",
    ),
    question(
      "q4",
      Language::C,
      "What is the correct format specifier for printing an integer in C?",
      &["%f", "%s", "%d", "%c"],
      2,
      "`%d` or `%i` is used for signed integers. `%f` is for floats, `%s` for strings, `%c` for characters.",
    ),
    question(
      "q5",
      Language::Cpp,
      "Which operator is used to access members of a class through a pointer in C++?",
      &[".", "->", "::", ":"],
      1,
      "The arrow operator `->` is used with pointers to objects. The dot operator `.` is used with objects directly.",
    ),
    question(
      "q6",
      Language::Java,
      "Which of these is NOT a primitive type in Java?",
      &["int", "boolean", "String", "double"],
      2,
      "`String` is a class (Reference Type) in Java, not a primitive type like `int` or `double`.",
    ),
  ]
}

pub fn interview_topics() -> Vec<InterviewTopic> {
  let topic = |id: &str, title: &str, category, content: &str| InterviewTopic {
    id: id.into(),
    title: title.into(),
    category,
    content: content.into(),
  };
  vec![
    topic(
      "dsa-big-o",
      "Big O Notation",
      TopicCategory::Dsa,
      "Big O notation describes the performance or complexity of an algorithm. \n\n- O(1): Constant time\n- O(log n): Logarithmic time (Binary Search)\n- O(n): Linear time (Simple Loop)\n- O(n^2): Quadratic time (Nested Loops)",
    ),
    topic(
      "beh-weakness",
      "What is your greatest weakness?",
      TopicCategory::Behavioral,
      "Do not say 'I work too hard'. Instead, mention a real skill you are improving. \n\n**Example:** 'I sometimes struggle with public speaking, so I have started volunteering to lead daily stand-ups to practice.'",
    ),
    topic(
      "sys-load-balancer",
      "What is a Load Balancer?",
      TopicCategory::SystemDesign,
      "A load balancer distributes incoming network traffic across multiple servers. This ensures no single server bears too much demand. Examples: Nginx, HAProxy, AWS ELB.",
    ),
    topic(
      "java-jdk-jre-jvm",
      "JDK vs JRE vs JVM",
      TopicCategory::Dsa,
      "**JVM** (Java Virtual Machine): Executes Java bytecode.\n**JRE** (Java Runtime Environment): Includes JVM + Libraries to run apps.\n**JDK** (Java Development Kit): Includes JRE + Compilers/Debuggers to write apps.",
    ),
    topic(
      "cpp-virtual",
      "Virtual Functions in C++",
      TopicCategory::Dsa,
      "A virtual function is a member function in a base class that you redefine in a derived class. It ensures that the correct function is called for an object, regardless of the type of pointer (polymorphism).",
    ),
  ]
}
